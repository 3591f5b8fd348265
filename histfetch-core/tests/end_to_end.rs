//! Full download runs against a fake HistData server.

use chrono::NaiveDate;
use histfetch_core::{Downloader, Period, PeriodStatus, Settings};
use mockito::{Matcher, Server};
use std::fs;
use std::io::{Cursor, Write};
use tempfile::TempDir;

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const FORM_PAGE: &str = r#"<html><body>
    <form id="file_down" action="get.php" method="POST">
      <input type="hidden" name="tk" value="t0k3n"/>
      <input type="hidden" name="file" value="HISTDATA_COM_ASCII_EURUSD_T202005.zip"/>
    </form>
</body></html>"#;

#[test]
fn only_successful_month_is_extracted() {
    let mut server = Server::new();
    let april = server
        .mock("GET", Matcher::Regex(r"eurusd/2020/4$".into()))
        .with_status(503)
        .create();
    let may = server
        .mock("GET", Matcher::Regex(r"eurusd/2020/5$".into()))
        .with_status(200)
        .with_body(FORM_PAGE)
        .create();
    let archive = server
        .mock("POST", "/get.php")
        .match_body(Matcher::UrlEncoded("tk".into(), "t0k3n".into()))
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_header(
            "content-disposition",
            "attachment; filename=\"HISTDATA_COM_ASCII_EURUSD_T202005.zip\"",
        )
        .with_body(zip_bytes(&[
            ("DAT_ASCII_EURUSD_T_202005.csv", "20200501 000000000,1.0950,1.0951,0\n"),
            ("DAT_ASCII_EURUSD_T_202005.txt", "same data as text\n"),
        ]))
        .expect(1)
        .create();

    let dest = TempDir::new().unwrap();
    let settings = Settings {
        histdata_base: format!("{}/download-free-forex-historical-data", server.url()),
        ..Settings::default()
    };
    let downloader = Downloader::new(&settings).unwrap();

    let report = downloader.run(
        "EURUSD",
        NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 5, 31).unwrap(),
        dest.path(),
    );

    april.assert();
    may.assert();
    archive.assert();

    assert_eq!(report.periods.len(), 2);
    assert!(matches!(report.periods[0].status, PeriodStatus::Skipped { .. }));
    assert_eq!(report.periods[1].period, Period::new(2020, 5).unwrap());
    assert!(matches!(report.periods[1].status, PeriodStatus::Extracted { .. }));

    let names: Vec<String> = fs::read_dir(dest.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["DAT_ASCII_EURUSD_T_202005.csv".to_string()]);
}

#[test]
fn corrupt_download_leaves_nothing_behind() {
    let mut server = Server::new();
    let _page = server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(r#"<a id="a_file">HISTDATA_COM_ASCII_EURUSD_T202005.zip</a>"#)
        .create();
    let _archive = server
        .mock("POST", "/get.php")
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_header("content-disposition", "attachment; filename=bad.zip")
        .with_body("this is not a zip")
        .create();

    let dest = TempDir::new().unwrap();
    let settings = Settings {
        histdata_base: format!("{}/download", server.url()),
        ..Settings::default()
    };
    let report = Downloader::new(&settings).unwrap().run(
        "EURUSD",
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        dest.path(),
    );

    assert!(matches!(
        report.periods[0].status,
        PeriodStatus::Corrupt { ref archive, .. } if archive == "bad.zip"
    ));
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}

//! Listing page parsing: find out how to request the archive.
//!
//! HistData listing pages normally carry a hidden form (`form#file_down`)
//! whose inputs are the download token. Some pages only expose an anchor
//! (`a#a_file`) whose text is the archive name; posting that name to the
//! default handler works too. Both markers are undocumented and can
//! change without notice.

use crate::source::FetchError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const FORM_SELECTOR: &str = "form#file_down";
const INPUT_SELECTOR: &str = "input[name]";
const LINK_SELECTOR: &str = "a#a_file";

/// Submission path used when the form has no action, and for the anchor fallback.
pub const DEFAULT_ACTION: &str = "get.php";

/// Extension an anchor's text must end with to count as an archive link.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// How to request one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAction {
    /// Absolute submission address.
    pub url: Url,
    /// Form fields in document order.
    pub payload: Vec<(String, String)>,
    /// Archive name to use if the response does not name one.
    pub fallback_name: Option<String>,
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("selector {css}: {e}")))
}

/// Resolve the download action from a listing page.
///
/// `page_url` is the address the page was fetched from; relative form
/// actions are resolved against it.
pub fn resolve_download(html: &str, page_url: &str) -> Result<DownloadAction, FetchError> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    if let Some(form) = document.select(&selector(FORM_SELECTOR)?).next() {
        return from_form(form, &base);
    }

    let link = document
        .select(&selector(LINK_SELECTOR)?)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|text| text.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION));

    match link {
        Some(name) => Ok(DownloadAction {
            url: base.join(DEFAULT_ACTION)?,
            payload: vec![("file".to_string(), name.clone())],
            fallback_name: Some(name),
        }),
        None => Err(FetchError::NoDownloadLink {
            url: page_url.to_string(),
        }),
    }
}

fn from_form(form: ElementRef<'_>, base: &Url) -> Result<DownloadAction, FetchError> {
    let payload: Vec<(String, String)> = form
        .select(&selector(INPUT_SELECTOR)?)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    let action = form
        .value()
        .attr("action")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_ACTION);

    // The "file" input usually holds the archive name.
    let fallback_name = payload
        .iter()
        .find(|(name, value)| {
            name == "file" && value.to_ascii_lowercase().ends_with(ARCHIVE_EXTENSION)
        })
        .map(|(_, value)| value.clone());

    Ok(DownloadAction {
        url: base.join(action)?,
        payload,
        fallback_name,
    })
}

//! Archive response checks: content type, content disposition, filename.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"filename=([^;]+)").expect("static filename pattern"))
}

/// Extract the `filename=` parameter from a content-disposition header.
///
/// Accepts quoted and unquoted values and ignores any parameters that
/// follow the filename.
pub fn filename(disposition: &str) -> Option<String> {
    let captures = filename_pattern().captures(disposition)?;
    let name = captures[1].trim().trim_matches('"').trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Whether a response looks like an archive attachment rather than a page.
///
/// HistData answers a rejected download with an HTML page and a 200, so
/// the status alone says nothing.
pub fn is_archive_response(content_type: &str, disposition: &str) -> bool {
    !content_type.to_ascii_lowercase().contains("html")
        && disposition.to_ascii_lowercase().contains("zip")
}

/// Reduce a server-supplied name to a bare file name safe to join onto the
/// destination directory.
pub fn safe_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Path::new(last)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

//! Local filename from a photo URL.

use reqwest::Url;

use crate::downloader::DownloadError;

/// Returns the last segment of the URL path when it looks like a file name
/// (non-empty and carrying an extension). Query and fragment are ignored.
pub fn resolve_filename(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::InvalidUrl {
        url: url.to_string(),
    })?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if segment.is_empty() || !segment.contains('.') {
        return Err(DownloadError::MissingFilename {
            url: url.to_string(),
        });
    }
    Ok(segment.to_string())
}

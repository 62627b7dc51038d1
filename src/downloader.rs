//! Downloads single photos into a camera directory, skipping files already on disk.
//!
//! The body is streamed to a `.part` sibling and renamed into place once complete,
//! so a file at the final path is always a finished download.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use filetime::FileTime;
use log::{info, warn};
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::enumerator::PhotoRef;
use crate::filename::resolve_filename;

/// Size of the write buffer between the response body and the file.
pub const CHUNK_SIZE: usize = 8 * 1024;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid photo url '{url}'")]
    InvalidUrl { url: String },

    #[error("photo filename missing in '{url}'")]
    MissingFilename { url: String },

    #[error("error downloading {url}: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error saving {}: {source}", path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    /// Problems confined to the photo's own URL. These never abort a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DownloadError::InvalidUrl { .. } | DownloadError::MissingFilename { .. }
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    Skipped(PathBuf),
}

/// True when `dir/filename` is already occupied. Size and content are not checked.
pub fn photo_exists(dir: &Path, filename: &str) -> bool {
    dir.join(filename).exists()
}

pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(client: Client) -> ImageDownloader {
        ImageDownloader { client }
    }

    pub async fn download(
        &self,
        photo: &PhotoRef,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        let filename = resolve_filename(&photo.url)?;
        let full_path = dir.join(&filename);

        // only download new images
        if photo_exists(dir, &filename) {
            info!("Skipping duplicate image: {}", full_path.display());
            return Ok(DownloadOutcome::Skipped(full_path));
        }

        let response = self
            .client
            .get(&photo.url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|source| DownloadError::RemoteFetch {
                url: photo.url.clone(),
                source,
            })?;

        let partial_path = partial_path(&full_path);
        if let Err(e) = write_body(response, &photo.url, &partial_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(e);
        }

        if let Err(source) = tokio::fs::rename(&partial_path, &full_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(DownloadError::LocalWrite {
                path: full_path,
                source,
            });
        }

        if let Some(taken_at) = photo.taken_at {
            set_capture_time(&full_path, taken_at);
        }

        info!(
            "Image successfully downloaded and saved to: {}",
            full_path.display()
        );
        Ok(DownloadOutcome::Downloaded(full_path))
    }
}

/// Creates `root/<camera>` if missing and returns it. Separators in the camera name
/// are replaced so each camera maps to exactly one directory under `root`.
pub fn ensure_camera_dir(root: &Path, camera_name: &str) -> io::Result<PathBuf> {
    let dir_name = camera_dir_name(camera_name).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("camera name '{camera_name}' is not usable as a directory name"),
        )
    })?;

    let cam_dir = root.join(dir_name);
    if !cam_dir.is_dir() {
        std::fs::create_dir_all(&cam_dir)?;
        info!("Created directory: {}", cam_dir.display());
    }
    Ok(cam_dir)
}

fn camera_dir_name(camera_name: &str) -> Option<String> {
    let name = camera_name.trim().replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

fn partial_path(full_path: &Path) -> PathBuf {
    let mut name: OsString = full_path.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    full_path.with_file_name(name)
}

async fn write_body(
    mut response: Response,
    url: &str,
    path: &Path,
) -> Result<(), DownloadError> {
    let local_write = |source: io::Error| DownloadError::LocalWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(local_write)?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| DownloadError::RemoteFetch {
            url: url.to_string(),
            source,
        })?
    {
        writer.write_all(&chunk).await.map_err(local_write)?;
    }

    writer.flush().await.map_err(local_write)?;
    writer.get_ref().sync_all().await.map_err(local_write)?;
    Ok(())
}

fn set_capture_time(path: &Path, taken_at: DateTime<Utc>) {
    let mtime = FileTime::from_unix_time(taken_at.timestamp(), 0);
    if let Err(e) = filetime::set_file_mtime(path, mtime) {
        warn!("Could not set modified time on {}: {e}", path.display());
    }
}

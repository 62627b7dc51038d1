use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::api::CameraApi;
use crate::config::{Config, CutoffMode, LogSink};
use crate::downloader::{DownloadOutcome, ImageDownloader, ensure_camera_dir};
use crate::enumerator::{CameraPhotoMap, cutoff_timestamp, photos_by_camera};
use crate::spypoint_client::{SpypointClient, build_client};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new files, {} skipped, {} failed",
            self.downloaded, self.skipped, self.failed
        )
    }
}

/// Logs in and performs one complete run.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let mut client = SpypointClient::new(&config.api_base)?;
    client
        .login(&config.username, &config.password)
        .await
        .context("Could not log in to Spypoint")?;

    run_with_api(&client, config, Utc::now()).await
}

pub async fn run_with_api<A: CameraApi>(
    api: &A,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let date_end = match config.cutoff {
        CutoffMode::Yesterday => {
            Some(cutoff_timestamp(now).context("Could not compute the date cutoff")?)
        }
        CutoffMode::All => None,
    };
    if let Some(date_end) = &date_end {
        info!("Listing photos taken before {date_end}");
    }

    let photo_urls = photos_by_camera(api, date_end.as_deref())
        .await
        .context("Could not list photos")?;

    download_all(&photo_urls, config).await
}

/// Downloads every photo of every camera, in listing order, one at a time.
pub async fn download_all(photo_urls: &CameraPhotoMap, config: &Config) -> Result<RunSummary> {
    let total = photo_urls.photo_count();
    let progress = progress_bar(&config.log_sink, total as u64)?;
    let downloader = ImageDownloader::new(build_client()?);
    let mut summary = RunSummary::default();

    info!(
        "Saving {total} photos from {} cameras to {}...",
        photo_urls.len(),
        config.download_root.display()
    );
    for (cam, photos) in photo_urls.iter() {
        let cam_dir = match ensure_camera_dir(&config.download_root, cam) {
            Ok(cam_dir) => cam_dir,
            Err(e) if config.continue_on_fetch_error => {
                error!("Could not create directory for camera '{cam}': {e}");
                summary.failed += photos.len();
                progress.inc(photos.len() as u64);
                continue;
            }
            Err(e) => {
                progress.abandon();
                return Err(e)
                    .with_context(|| format!("Could not create directory for camera '{cam}'"));
            }
        };
        progress.set_message(cam.to_string());

        for photo in photos {
            match downloader.download(photo, &cam_dir).await {
                Ok(DownloadOutcome::Downloaded(_)) => summary.downloaded += 1,
                Ok(DownloadOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) if e.is_recoverable() || config.continue_on_fetch_error => {
                    error!("{e}");
                    summary.failed += 1;
                }
                Err(e) => {
                    progress.abandon();
                    error!("{e}");
                    return Err(e).context("Stopping run after download failure");
                }
            }
            progress.inc(1);
        }
    }

    progress.finish_and_clear();
    info!("Finished. {summary}.");
    Ok(summary)
}

fn progress_bar(sink: &LogSink, total: u64) -> Result<ProgressBar> {
    // console output is the log itself
    if *sink == LogSink::Console {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new(total);
    progress.set_style(ProgressStyle::with_template(
        "{msg:20} [{bar:40}] {pos}/{len}",
    )?);
    Ok(progress)
}

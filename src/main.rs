use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use git_version::git_version;
use log::info;
use spypoint_downloader::config::{
    Config, CutoffMode, DEFAULT_LOG_BACKUPS, LOG_MAX_BYTES, LogSink, load_env_file,
};
use spypoint_downloader::logging::init_logging;
use spypoint_downloader::orchestrator;
use spypoint_downloader::spypoint_client::DEFAULT_API_BASE;

pub const GIT_VERSION: &str = git_version!(args = ["--always", "--dirty=-modified"], fallback = "unknown");

/// Spypoint Downloader
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, env = "SPYPOINT_USERNAME")]
    username: String,

    #[clap(short, long, env = "SPYPOINT_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(short, long, env = "SPYPOINT_DOWNLOAD_PATH")]
    output_directory: PathBuf,

    /// Which photos to list.
    #[clap(long, value_enum, default_value_t = CutoffMode::Yesterday)]
    cutoff: CutoffMode,

    /// Exit on the first failed download instead of moving on to the next photo.
    #[clap(long)]
    fail_fast: bool,

    /// Log to this file, rotated at 1 MiB, instead of the console.
    #[clap(long, env = "SPYPOINT_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[clap(long, default_value_t = DEFAULT_LOG_BACKUPS)]
    log_backups: usize,

    #[clap(long, default_value = DEFAULT_API_BASE, hide = true)]
    api_base: String,
}

impl Args {
    fn into_config(self) -> Config {
        let log_sink = match self.log_file {
            Some(path) => LogSink::RotatingFile {
                path,
                max_bytes: LOG_MAX_BYTES,
                backups: self.log_backups,
            },
            None => LogSink::Console,
        };

        Config {
            username: self.username,
            password: self.password,
            download_root: self.output_directory,
            cutoff: self.cutoff,
            continue_on_fetch_error: !self.fail_fast,
            log_sink,
            api_base: self.api_base,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file(Path::new(".env")).context("Could not read .env")?;
    let config = Args::parse().into_config();
    config.validate()?;
    init_logging(&config.log_sink).context("Could not set up logging")?;

    info!("Spypoint Downloader {} ({GIT_VERSION})", env!("CARGO_PKG_VERSION"));

    orchestrator::run(&config).await?;
    Ok(())
}

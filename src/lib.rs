pub mod api;
pub mod config;
pub mod downloader;
pub mod enumerator;
pub mod filename;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod spypoint_client;

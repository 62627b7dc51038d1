use crate::model::{Camera, Photo};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("not logged in")]
    NotAuthenticated,
}

/// The camera-management operations a run needs. Authentication is owned by the
/// implementor and happens before it is handed to the orchestrator.
#[allow(async_fn_in_trait)]
pub trait CameraApi {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ApiError>;

    /// Photos of `cameras` taken strictly before `date_end`, at most `limit` of them.
    async fn list_photos(
        &self,
        cameras: &[Camera],
        limit: u32,
        date_end: Option<&str>,
    ) -> Result<Vec<Photo>, ApiError>;
}

pub use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound the API uses when no cutoff is requested.
pub const OPEN_DATE_END: &str = "2100-01-01T00:00:00.000Z";

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Camera {
    #[serde(alias = "_id")]
    pub id: String,
    pub config: CameraConfig,
}

impl Camera {
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CameraConfig {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PhotoQuery {
    pub camera: Vec<String>,
    #[serde(rename = "dateEnd")]
    pub date_end: String,
    pub favorite: bool,
    pub hd: bool,
    pub limit: u32,
    pub tag: Vec<String>,
}

impl PhotoQuery {
    pub fn new(cameras: &[Camera], limit: u32, date_end: Option<&str>) -> PhotoQuery {
        PhotoQuery {
            camera: cameras.iter().map(|c| c.id.clone()).collect(),
            date_end: date_end.unwrap_or(OPEN_DATE_END).to_string(),
            favorite: false,
            hd: false,
            limit,
            tag: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PhotoList {
    pub photos: Vec<Photo>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Photo {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "originName", default)]
    pub origin_name: Option<String>,
    pub large: PhotoVariant,
}

impl Photo {
    pub fn url(&self) -> String {
        let host = self.large.host.trim_end_matches('/');
        let path = self.large.path.trim_start_matches('/');
        format!("https://{host}/{path}")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PhotoVariant {
    pub host: String,
    pub path: String,
}

use chrono::{DateTime, Days, NaiveTime, SecondsFormat, Utc};
use log::{debug, warn};

use crate::api::{ApiError, CameraApi};

/// Per-camera listing bound. Photos past it are not fetched.
pub const PHOTO_LIMIT: u32 = 10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub url: String,
    pub taken_at: Option<DateTime<Utc>>,
}

impl PhotoRef {
    pub fn new(url: impl Into<String>) -> PhotoRef {
        PhotoRef {
            url: url.into(),
            taken_at: None,
        }
    }
}

/// Camera display name to its photos. Cameras keep the order the API listed them
/// in, and each camera's photos keep the order they were returned in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CameraPhotoMap {
    cameras: Vec<(String, Vec<PhotoRef>)>,
}

impl CameraPhotoMap {
    pub fn new() -> CameraPhotoMap {
        CameraPhotoMap::default()
    }

    /// Appends `photos` to camera `name`, adding the camera at the end if it is new.
    /// Returns true when the camera was already present.
    pub fn insert_photos(
        &mut self,
        name: &str,
        photos: impl IntoIterator<Item = PhotoRef>,
    ) -> bool {
        match self.cameras.iter_mut().find(|(cam, _)| cam == name) {
            Some((_, existing)) => {
                existing.extend(photos);
                true
            }
            None => {
                self.cameras
                    .push((name.to_string(), photos.into_iter().collect()));
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[PhotoRef]> {
        self.cameras
            .iter()
            .find(|(cam, _)| cam == name)
            .map(|(_, photos)| photos.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PhotoRef])> {
        self.cameras
            .iter()
            .map(|(cam, photos)| (cam.as_str(), photos.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cameras.iter().map(|(cam, _)| cam.as_str())
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn photo_count(&self) -> usize {
        self.cameras.iter().map(|(_, photos)| photos.len()).sum()
    }
}

/// Midnight UTC of the day before `now`, e.g. `2024-03-14T00:00:00.000Z`.
pub fn cutoff_timestamp(now: DateTime<Utc>) -> Option<String> {
    let yesterday = now.date_naive().checked_sub_days(Days::new(1))?;
    let midnight = yesterday.and_time(NaiveTime::MIN).and_utc();
    Some(midnight.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub async fn photos_by_camera<A: CameraApi>(
    api: &A,
    date_end: Option<&str>,
) -> Result<CameraPhotoMap, ApiError> {
    let mut res = CameraPhotoMap::new();
    let cameras = api.list_cameras().await?;
    debug!("Found {} cameras", cameras.len());

    for camera in cameras {
        let photos = api
            .list_photos(std::slice::from_ref(&camera), PHOTO_LIMIT, date_end)
            .await?;
        debug!("Camera '{}' has {} photos", camera.name(), photos.len());

        let refs = photos.iter().map(|p| PhotoRef {
            url: p.url(),
            taken_at: p.date,
        });

        if res.insert_photos(camera.name(), refs) {
            warn!(
                "Camera name '{}' is shared by several cameras, merging their photos",
                camera.name()
            );
        }
    }

    Ok(res)
}

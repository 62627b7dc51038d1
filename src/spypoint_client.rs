use log::debug;
use reqwest::{Client, RequestBuilder, Response, header};

use crate::api::{ApiError, CameraApi};
use crate::model::{Camera, LoginRequest, LoginResponse, Photo, PhotoList, PhotoQuery};

pub const DEFAULT_API_BASE: &str = "https://restapi.spypoint.com/api/v3";

const USER_AGENT: &str = concat!("spypoint-downloader/", env!("CARGO_PKG_VERSION"));

pub struct SpypointClient {
    base_address: String,
    auth_token: Option<String>,
    client: Client,
}

impl SpypointClient {
    pub fn new(base_address: &str) -> Result<SpypointClient, ApiError> {
        Ok(SpypointClient {
            base_address: base_address.trim_end_matches('/').to_string(),
            auth_token: None,
            client: build_client().map_err(|source| ApiError::Transport {
                endpoint: base_address.to_string(),
                source,
            })?,
        })
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let endpoint = self.endpoint("user/login");
        let request = self
            .client
            .post(&endpoint)
            .json(&LoginRequest { username, password });
        let login: LoginResponse = parse(send(request, &endpoint).await?, &endpoint).await?;

        debug!("Logged in as {username}");
        self.auth_token = Some(login.token);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{base}/{path}", base = self.base_address)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.auth_token.as_ref().ok_or(ApiError::NotAuthenticated)?;
        Ok(request.header(header::AUTHORIZATION, format!("bearer {token}")))
    }
}

impl CameraApi for SpypointClient {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ApiError> {
        let endpoint = self.endpoint("camera/all");
        let request = self.authorized(self.client.get(&endpoint))?;
        parse(send(request, &endpoint).await?, &endpoint).await
    }

    async fn list_photos(
        &self,
        cameras: &[Camera],
        limit: u32,
        date_end: Option<&str>,
    ) -> Result<Vec<Photo>, ApiError> {
        let endpoint = self.endpoint("photo/all");
        let query = PhotoQuery::new(cameras, limit, date_end);
        let request = self.authorized(self.client.post(&endpoint).json(&query))?;
        let list: PhotoList = parse(send(request, &endpoint).await?, &endpoint).await?;
        Ok(list.photos)
    }
}

/// Client used for photo downloads as well as API calls.
pub fn build_client() -> reqwest::Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(USER_AGENT),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .build()
}

async fn send(request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|source| ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }
    Ok(response)
}

async fn parse<T: serde::de::DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|source| ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })
}

use std::time::Duration;

use anyhow::{Context as _, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_API: &str = "https://api.imgur.com";

/// Anonymous image-host upload client.
pub struct ImgurClient {
    client: Client,
    base_api: String,
    client_id: String,
}

impl ImgurClient {
    pub fn new(base_api: String, client_id: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_api,
            client_id,
        })
    }

    /// Expects IMGUR_CLIENT_ID to be set; IMGUR_API_BASE_URL overrides the
    /// host.
    pub fn from_env() -> Result<Self> {
        let base_api = std::env::var("IMGUR_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_API.to_string());
        let client_id = std::env::var("IMGUR_CLIENT_ID")
            .context("IMGUR_CLIENT_ID environment variable not set")?;

        Self::new(base_api, client_id)
    }

    /// Upload a PNG, returning the hosted image link.
    pub async fn upload(&self, image: &[u8], title: &str) -> Result<String> {
        let url = format!("{}/3/upload.json", self.base_api.trim_end_matches('/'));
        let form = [
            ("image", STANDARD.encode(image)),
            ("title", title.to_string()),
        ];

        let res: UploadResponse = self
            .client
            .post(url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(res.data.link)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: String,
}

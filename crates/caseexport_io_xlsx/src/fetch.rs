//! Picture sources for image-mode attachment cells.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};

use crate::spec::FetchImageError;

/// Resolve an attachment URL to a decoded image.
pub trait ImageFetcher {
    /// Fetch and decode the image behind `url`.
    fn fetch(&self, url: &str) -> Result<DynamicImage, FetchImageError>;
}

/// Blocking HTTP(S) fetcher. Runs on the caller's thread.
#[derive(Clone)]
pub struct HttpImageFetcher {
    http: reqwest::blocking::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher; `timeout = None` never times out.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchImageError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()
            .map_err(|err| FetchImageError::Client(err.to_string()))?;
        Ok(Self { http })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<DynamicImage, FetchImageError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|err| FetchImageError::Request {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchImageError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let v_body = response.bytes().map_err(|err| FetchImageError::Request {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        decode_image_bytes(url, &v_body)
    }
}

/// Decode image bytes, guessing the format from content.
pub fn decode_image_bytes(url: &str, v_bytes: &[u8]) -> Result<DynamicImage, FetchImageError> {
    image::load_from_memory(v_bytes).map_err(|err| FetchImageError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// Re-encode a decoded image as PNG bytes.
pub fn encode_image_png(img: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| format!("Failed to encode picture as PNG: {err}"))?;
    Ok(cursor.into_inner())
}

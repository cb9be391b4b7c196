//! HTTP layer: request execution and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use tracing::debug;

use crate::error::{FlakeError, FlakeResult};

use super::helpers::body_excerpt;

/// HTTP backend for making requests.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
}

impl HttpBackend {
    /// GET `url` and return the body as text; any non-2xx status is an error.
    pub(crate) async fn get_text(&self, url: &str) -> FlakeResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let body = response.text().await.map_err(|e| FlakeError::Network {
                    message: format!("failed to read response body from {}: {}", url, e),
                })?;
                debug!(url, bytes = body.len(), "fetched");
                Ok(body)
            }

            404 => Err(FlakeError::Network {
                message: format!("HTTP 404: {} not found", url),
            }),

            _ => {
                let message = response
                    .text()
                    .await
                    .map(|b| body_excerpt(&b))
                    .unwrap_or_else(|_| status.to_string());
                Err(FlakeError::Network {
                    message: format!("HTTP {} from {}: {}", status.as_u16(), url, message),
                })
            }
        }
    }
}

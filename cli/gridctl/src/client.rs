//! HTTP client for the controller's operator API.

use anyhow::{Context, Result};
use gridwide_protocol::Command;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::CliError;

/// Operator API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the controller at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let response = self.client.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a PUT request.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<(), CliError> {
        let response = self.client.delete(self.url(path)).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            self.handle_error(response).await
        }
    }

    /// Issue `command` to the region matching `query`.
    pub async fn issue(&self, query: &str, command: &Command) -> Result<Delivery, CliError> {
        let path = format!("/v1/regions/{}/commands", urlencoding::encode(query));
        self.post(&path, command).await.map_err(|e| match e {
            CliError::Api { status: 404, code, .. } if code == "region_not_found" => {
                CliError::NoMatchingRegion(query.to_string())
            }
            other => other,
        })
    }

    /// Handle a successful or error response.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CliError> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to parse response: {}", e)))
        } else {
            self.handle_error(response).await
        }
    }

    /// Handle an error response.
    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, CliError> {
        let status = response.status().as_u16();

        // Try to parse error response
        let error_body: ApiErrorResponse =
            response.json().await.unwrap_or_else(|_| ApiErrorResponse {
                code: "unknown".to_string(),
                detail: "Unknown error".to_string(),
                request_id: None,
            });

        Err(CliError::api(
            status,
            error_body.code,
            error_body.detail,
            error_body.request_id,
        ))
    }
}

/// Problem document returned by the controller on errors.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    code: String,
    detail: String,
    #[serde(default)]
    request_id: Option<String>,
}

/// Acknowledgement of an issued command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub region: String,
    pub method: String,
    pub request_id: String,
}

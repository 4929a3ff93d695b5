//! HTTP client for the Grafana provisioning API

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::config::GrafanaConfig;
use crate::error::{Error, Result};
use crate::models::{AlertRule, Folder};

/// Fixed timeout applied to every request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROVISIONING_PATH: &str = "/api/v1/provisioning/alert-rules";

/// Client for the Grafana provisioning REST API.
///
/// Carries the JSON content headers on every request, plus either a bearer
/// token (as a default header) or basic-auth credentials (attached per
/// request).
pub struct GrafanaClient {
    http: reqwest::Client,
    base_url: String,
    user: Option<String>,
    password: Option<String>,
}

impl GrafanaClient {
    /// Build a client from connection settings.
    pub fn new(config: &GrafanaConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::config("GRAFANA_TOKEN contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// All folders on the server.
    pub async fn folders(&self) -> Result<Vec<Folder>> {
        let response = self.request(Method::GET, "/api/folders").send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// All provisioned alert rules.
    pub async fn alert_rules(&self) -> Result<Vec<AlertRule>> {
        let response = self.request(Method::GET, PROVISIONING_PATH).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Look up one alert rule by UID.
    ///
    /// `Some` only for an HTTP 200 with a decodable body; any other status or
    /// a transport failure reads as "not found".
    pub async fn alert_rule(&self, uid: &str) -> Option<AlertRule> {
        let url = format!("{PROVISIONING_PATH}/{uid}");
        let response = match self.request(Method::GET, &url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(uid, error = %e, "alert rule lookup failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            return None;
        }

        match response.json().await {
            Ok(rule) => Some(rule),
            Err(e) => {
                debug!(uid, error = %e, "alert rule response was not decodable");
                None
            }
        }
    }

    /// Create a new alert rule. The response echoes the assigned UID.
    pub async fn create_alert_rule(&self, rule: &AlertRule) -> Result<AlertRule> {
        let response = self
            .request(Method::POST, PROVISIONING_PATH)
            .json(rule)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Update an existing alert rule by UID with a full rule body.
    pub async fn update_alert_rule(&self, uid: &str, rule: &AlertRule) -> Result<AlertRule> {
        let response = self
            .request(Method::PUT, &format!("{PROVISIONING_PATH}/{uid}"))
            .json(rule)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete an alert rule by UID.
    pub async fn delete_alert_rule(&self, uid: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("{PROVISIONING_PATH}/{uid}"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.http.request(method, format!("{}{path}", self.base_url));
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            request = request.basic_auth(user, Some(password));
        }
        request
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api { status, body })
        }
    }
}

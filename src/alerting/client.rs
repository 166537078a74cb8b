//! HTTP client for the alerting backend's checks API

use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::Url;

use crate::checks::Check;

/// Basic auth credentials for the alerting backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Client for creating and deleting checks
#[derive(Debug, Clone)]
pub struct AlertingClient {
    /// Base URL without trailing slash
    base_url: String,
    base: Url,
    credentials: Option<Credentials>,
    http_client: reqwest::Client,
}

impl AlertingClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// Idle connections are not kept, so every call opens its own connection.
    /// Without a `timeout` requests wait as long as the backend takes.
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        if credentials.is_none() {
            tracing::info!(
                url = %base_url,
                "No authentication information found for the alerting backend"
            );
        }

        Ok(Self {
            base_url,
            base,
            credentials,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a check and return the identifier the backend assigned to it
    pub async fn create(&self, check: &Check) -> Result<String, ClientError> {
        let url = format!("{}/api/checks", self.base_url);
        tracing::debug!(check = %check.name, url = %url, "Creating check");

        let response = self
            .authorize(self.http_client.post(&url).json(check))
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to create check: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.to_string(),
                body,
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(ClientError::NoLocationHeader)?;

        let id = self.id_from_location(location)?;
        tracing::debug!(check = %check.name, check_id = %id, "Check created");
        Ok(id)
    }

    /// Delete the check identified by `check.id`, returning the response status line.
    ///
    /// Error statuses from the backend are returned as text, not as errors.
    pub async fn delete(&self, check: &Check) -> Result<String, ClientError> {
        if !check.is_registered() {
            return Err(ClientError::MissingId);
        }

        let url = format!("{}/api/checks/{}", self.base_url, check.id);
        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to delete check: {}", e)))?;

        Ok(response.status().to_string())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }

    /// Last path segment of a `Location` header, which may be relative
    fn id_from_location(&self, location: &str) -> Result<String, ClientError> {
        let url = self
            .base
            .join(location)
            .map_err(|_| ClientError::InvalidLocation(location.to_string()))?;

        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidLocation(location.to_string()))
    }
}

/// Alerting backend errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid alerting backend URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: String, body: String },

    #[error("No Location header in response, cannot determine the check id")]
    NoLocationHeader,

    #[error("Cannot read a check id from Location '{0}'")]
    InvalidLocation(String),

    #[error("Check has no id")]
    MissingId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::testing::StubBackend;

    fn check(name: &str) -> Check {
        Check {
            id: String::new(),
            name: name.to_string(),
            description: format!("Check added from grafana for '{}'", name),
            target: "servers.*.cpu".to_string(),
            warn: "5.000000".to_string(),
            error: "10.000000".to_string(),
            enabled: true,
            live: false,
            from: None,
            until: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let backend = StubBackend::start().await;
        let client = AlertingClient::new(&backend.url, None, None).unwrap();

        let mut c = check("cpu");
        let id = client.create(&c).await.unwrap();
        assert_eq!(id, "42");

        c.id = id;
        let status = client.delete(&c).await.unwrap();
        assert_eq!(status, "204 No Content");

        let created = backend.state.created.lock().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["name"], "cpu");
        assert_eq!(created[0]["warn"], "5.000000");
        assert_eq!(created[0]["live"], false);
        assert!(created[0].get("id").is_none());
        assert_eq!(*backend.state.deleted.lock(), vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_create_without_location_fails() {
        let backend = StubBackend::start().await;
        backend.state.omit_location();
        let client = AlertingClient::new(&backend.url, None, None).unwrap();

        let err = client.create(&check("cpu")).await.unwrap_err();
        assert!(matches!(err, ClientError::NoLocationHeader));
    }

    #[tokio::test]
    async fn test_create_rejected_by_backend() {
        let backend = StubBackend::start().await;
        backend.state.reject("cpu");
        let client = AlertingClient::new(&backend.url, None, None).unwrap();

        let err = client.create(&check("cpu")).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { ref status, .. } if status.starts_with("400")));
    }

    #[tokio::test]
    async fn test_basic_auth_is_sent() {
        let backend = StubBackend::start().await;
        let credentials = Credentials {
            username: "grafana".to_string(),
            password: "secret".to_string(),
        };
        let client = AlertingClient::new(&backend.url, Some(credentials), None).unwrap();
        client.create(&check("cpu")).await.unwrap();

        let anonymous = AlertingClient::new(&backend.url, None, None).unwrap();
        anonymous.create(&check("mem")).await.unwrap();

        let auth = backend.state.auth.lock().clone();
        // base64("grafana:secret")
        assert_eq!(auth[0].as_deref(), Some("Basic Z3JhZmFuYTpzZWNyZXQ="));
        assert_eq!(auth[1], None);
    }

    #[tokio::test]
    async fn test_delete_reports_error_status_as_text() {
        let backend = StubBackend::start().await;
        let client = AlertingClient::new(&backend.url, None, None).unwrap();

        let mut c = check("cpu");
        c.id = "missing".to_string();
        let status = client.delete(&c).await.unwrap();
        assert_eq!(status, "404 Not Found");

        let err = client.delete(&check("cpu")).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingId));
    }

    #[tokio::test]
    async fn test_network_failure() {
        // Nothing listens on the discard port
        let client = AlertingClient::new("http://127.0.0.1:9", None, None).unwrap();
        let err = client.create(&check("cpu")).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_id_from_location() {
        let client = AlertingClient::new("http://seyren.local:8080/", None, None).unwrap();
        assert_eq!(client.base_url(), "http://seyren.local:8080");

        assert_eq!(client.id_from_location("/api/checks/42").unwrap(), "42");
        assert_eq!(
            client
                .id_from_location("http://other:9000/api/checks/5a1b2c")
                .unwrap(),
            "5a1b2c"
        );
        assert_eq!(client.id_from_location("/api/checks/7/").unwrap(), "7");
        assert!(matches!(
            client.id_from_location("/"),
            Err(ClientError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = AlertingClient::new("not a url", None, None).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }
}

//! Encode job fetching over HTTP.

use packline_models::EncodeJob;
use reqwest::Client;
use tracing::debug;

use crate::config::PackagingConfig;
use crate::error::{CoreError, CoreResult};

/// Fixed basic auth user of the transcoder API.
pub const BASIC_AUTH_USER: &str = "user";

/// HTTP client for encode job descriptions.
pub struct JobFetcher {
    client: Client,
    password: Option<String>,
    access_token: Option<String>,
}

impl JobFetcher {
    pub fn new(config: &PackagingConfig) -> Self {
        Self {
            client: Client::new(),
            password: config.encoder_password.clone(),
            access_token: config.service_access_token.clone(),
        }
    }

    /// Fetch and deserialize an encode job. Non-2xx responses are fetch
    /// failures, terminal for the job being handled.
    pub async fn fetch(&self, url: &str) -> CoreResult<EncodeJob> {
        debug!(url, "fetching encode job");
        let mut request = self.client.get(url);
        if let Some(password) = &self.password {
            request = request.basic_auth(BASIC_AUTH_USER, Some(password));
        }
        if let Some(token) = &self.access_token {
            request = request.header("x-jwt", format!("Bearer {token}"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| CoreError::fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CoreError::fetch(format!(
                "got status: {}",
                response.status().as_u16()
            )));
        }
        response
            .json::<EncodeJob>()
            .await
            .map_err(|e| CoreError::fetch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packline_models::JobStatus;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_body() -> serde_json::Value {
        json!({
            "id": "j1",
            "status": "SUCCESSFUL",
            "output": [],
            "inputs": [{"uri": "https://assets.test.com/test-asset.mp4"}]
        })
    }

    #[tokio::test]
    async fn fetches_and_deserializes_job() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/encodeJobs/j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body()))
            .mount(&server)
            .await;

        let fetcher = JobFetcher::new(&PackagingConfig::default());
        let job = fetcher
            .fetch(&format!("{}/encodeJobs/j1", server.uri()))
            .await
            .unwrap();
        assert_eq!(job.id, "j1");
        assert_eq!(job.status, JobStatus::Successful);
    }

    #[tokio::test]
    async fn sends_basic_auth_and_bearer_headers() {
        let server = MockServer::start().await;
        // user:secret
        Mock::given(method("GET"))
            .and(path("/encodeJobs/j1"))
            .and(header("Authorization", "Basic dXNlcjpzZWNyZXQ="))
            .and(header("x-jwt", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body()))
            .mount(&server)
            .await;

        let config = PackagingConfig {
            encoder_password: Some("secret".to_string()),
            service_access_token: Some("token-1".to_string()),
            ..PackagingConfig::default()
        };
        let fetcher = JobFetcher::new(&config);
        let job = fetcher
            .fetch(&format!("{}/encodeJobs/j1", server.uri()))
            .await
            .unwrap();
        assert_eq!(job.id, "j1");
    }

    #[tokio::test]
    async fn non_2xx_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = JobFetcher::new(&PackagingConfig::default());
        let err = fetcher
            .fetch(&format!("{}/encodeJobs/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Fetch(_)));
    }
}

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use super::models::JiraField;

/// Per-request tracker credentials. The proxy is multi-tenant: every search
/// request carries its own domain and API token, nothing is stored.
#[derive(Debug, Clone)]
pub struct TrackerCredentials {
    pub domain: String,
    pub email: String,
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub max_results: u32,
}

impl Default for JiraClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            max_results: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JiraClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraClientConfig,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch the tracker's field metadata, used to locate the deployment's
    /// story-points field by name.
    pub async fn fetch_fields(
        &self,
        creds: &TrackerCredentials,
    ) -> Result<Vec<JiraField>, JiraClientError> {
        let url = format!("{}/rest/api/3/field", creds.domain);
        let response = self
            .execute_with_retry(|| {
                self.client
                    .get(&url)
                    .basic_auth(&creds.email, Some(&creds.api_token))
                    .header("Accept", "application/json")
            })
            .await?;

        response
            .json::<Vec<JiraField>>()
            .await
            .map_err(JiraClientError::RequestError)
    }

    /// Run a JQL search and return the raw payload. The collection arrives
    /// materialized in one response or the call fails outright; there is no
    /// partial/streamed result.
    pub async fn search(
        &self,
        creds: &TrackerCredentials,
        jql: &str,
    ) -> Result<Value, JiraClientError> {
        let url = format!("{}/rest/api/3/search/jql", creds.domain);
        let body = serde_json::json!({
            "jql": jql,
            "maxResults": self.config.max_results,
            "fields": ["*all"]
        });

        let response = self
            .execute_with_retry(|| {
                self.client
                    .post(&url)
                    .basic_auth(&creds.email, Some(&creds.api_token))
                    .header("Accept", "application/json")
                    .json(&body)
            })
            .await?;

        response
            .json::<Value>()
            .await
            .map_err(JiraClientError::RequestError)
    }

    /// Send a request, retrying transient failures (connect/timeout, 429
    /// honoring Retry-After, 5xx) with capped exponential backoff. Other
    /// 4xx responses fail fast.
    async fn execute_with_retry(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<reqwest::Response, JiraClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match build().send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(JiraClientError::RequestError(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(JiraClientError::HttpError { status, body });
        }

        Err(JiraClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> JiraClient {
        JiraClient::new(JiraClientConfig {
            timeout_secs: 5,
            max_retries: 2,
            max_results: 100,
        })
        .expect("client should build")
    }

    fn creds(domain: &str) -> TrackerCredentials {
        TrackerCredentials {
            domain: domain.to_string(),
            email: "pm@example.com".to_string(),
            api_token: "token".to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_fields_parses_metadata() {
        let server = MockServer::start().await;
        let fields = json!([
            { "id": "summary", "name": "Summary" },
            { "id": "customfield_10058", "name": "Story Points" }
        ]);

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&fields))
            .mount(&server)
            .await;

        let result = test_client().fetch_fields(&creds(&server.uri())).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].id, "customfield_10058");
        assert_eq!(result[1].name.as_deref(), Some("Story Points"));
    }

    #[tokio::test]
    async fn search_posts_jql_with_wildcard_fields() {
        let server = MockServer::start().await;
        let payload = json!({
            "total": 1,
            "issues": [ { "key": "MPS-1", "fields": { "summary": "a" } } ]
        });

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(body_partial_json(json!({
                "jql": "ORDER BY created DESC",
                "fields": ["*all"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .mount(&server)
            .await;

        let result = test_client()
            .search(&creds(&server.uri()), "ORDER BY created DESC")
            .await
            .unwrap();
        assert_eq!(result["issues"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uses_basic_auth() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        test_client().fetch_fields(&creds(&server.uri())).await.unwrap();
    }

    #[tokio::test]
    async fn retries_on_500() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let result = test_client().fetch_fields(&creds(&server.uri())).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn fails_fast_on_401() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = test_client()
            .fetch_fields(&creds(&server.uri()))
            .await
            .unwrap_err();
        match err {
            JiraClientError::HttpError { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("expected HttpError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn max_retries_exceeded_on_persistent_500() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(500).set_body_string("always failing"))
            .mount(&server)
            .await;

        let client = JiraClient::new(JiraClientConfig {
            timeout_secs: 5,
            max_retries: 1,
            max_results: 100,
        })
        .unwrap();

        let err = client
            .search(&creds(&server.uri()), "ORDER BY created DESC")
            .await
            .unwrap_err();
        assert!(matches!(err, JiraClientError::MaxRetriesExceeded { .. }));
    }
}

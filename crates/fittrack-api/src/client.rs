use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::{ApiError, Result};
use crate::models::{
    Exercise, Program, ProgramDay, ProgramFeedback, Quote, User, UserProgramProgress, Workout,
};
use crate::retry::{with_retry, RetryConfig};

pub const DEFAULT_API_BASE: &str = "https://api.fittrack.app/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for [`FitnessClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Bearer token issued by the identity provider
    pub token: Option<String>,
    /// Applied to GET requests only
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
            retry: RetryConfig::none(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// REST client for the fitness backend
///
/// One method per backend operation, one HTTP request per call (plus
/// retries for GETs when configured). Failures are logged here and then
/// handed back to the caller untouched.
#[derive(Debug, Clone)]
pub struct FitnessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl FitnessClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "fittrack/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            timeout: config.timeout,
            retry_config: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_program(&self, program_id: &str) -> Result<Program> {
        self.get_json(&format!("/programs/{}", segment(program_id)))
            .await
    }

    pub async fn list_programs(&self) -> Result<Vec<Program>> {
        self.get_json("/programs").await
    }

    pub async fn get_program_day(&self, program_id: &str, day_id: &str) -> Result<ProgramDay> {
        self.get_json(&format!(
            "/programs/{}/days/{}",
            segment(program_id),
            segment(day_id)
        ))
        .await
    }

    pub async fn get_workout(&self, workout_id: &str) -> Result<Workout> {
        self.get_json(&format!("/workouts/{}", segment(workout_id)))
            .await
    }

    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise> {
        self.get_json(&format!("/exercises/{}", segment(exercise_id)))
            .await
    }

    pub async fn get_quote(&self, quote_id: &str) -> Result<Quote> {
        self.get_json(&format!("/quotes/{}", segment(quote_id)))
            .await
    }

    pub async fn get_random_quote(&self) -> Result<Quote> {
        self.get_json("/quotes/random").await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.get_json(&format!("/users/{}", segment(user_id))).await
    }

    pub async fn get_user_program_progress(
        &self,
        user_id: &str,
        program_id: &str,
    ) -> Result<UserProgramProgress> {
        self.get_json(&format!(
            "/users/{}/programs/{}/progress",
            segment(user_id),
            segment(program_id)
        ))
        .await
    }

    /// Send program feedback. Never retried.
    pub async fn submit_program_feedback(&self, feedback: &ProgramFeedback) -> Result<()> {
        let endpoint = "/feedback/programs";
        info!(
            program_id = %feedback.program_id,
            feedback_type = %feedback.feedback_type,
            "Submitting program feedback"
        );

        let result = async {
            let response = self
                .request(Method::POST, endpoint)
                .json(feedback)
                .send()
                .await
                .map_err(|e| self.classify(endpoint, e))?;
            self.check_status(endpoint, response).await?;
            Ok::<(), ApiError>(())
        }
        .await;

        if let Err(e) = &result {
            self.log_failure(endpoint, e);
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!("GET {}", endpoint);

        let result = with_retry(&self.retry_config, ApiError::is_retryable, || async {
            let response = self
                .request(Method::GET, endpoint)
                .send()
                .await
                .map_err(|e| self.classify(endpoint, e))?;
            let response = self.check_status(endpoint, response).await?;
            let body = response
                .text()
                .await
                .map_err(|e| self.classify(endpoint, e))?;
            Ok::<T, ApiError>(serde_json::from_str::<T>(&body)?)
        })
        .await;

        if let Err(e) = &result {
            self.log_failure(endpoint, e);
        }
        result
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(&self, endpoint: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(endpoint.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ApiError::Unauthorized(endpoint.to_string()))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Transport {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    fn classify(&self, endpoint: &str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                endpoint: endpoint.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            ApiError::Network(err)
        }
    }

    fn log_failure(&self, endpoint: &str, err: &ApiError) {
        match err {
            ApiError::Timeout { .. } => error!(endpoint, "Request aborted due to timeout: {}", err),
            _ => error!(endpoint, "Request failed: {}", err),
        }
    }
}

/// Percent-encode a path segment
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::FeedbackType;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FitnessClient {
        FitnessClient::new(ClientConfig::with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_get_program() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/programs/P1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ProgramId": "P1",
                "ProgramName": "Strength 101",
                "Level": "Beginner",
                "Days": 24,
                "Weeks": 8
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let program = client_for(&mock_server).get_program("P1").await.unwrap();
        assert_eq!(program.program_name, "Strength 101");
        assert_eq!(program.weeks, 8);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/U1"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "UserId": "U1" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FitnessClient::new(ClientConfig {
            token: Some("secret-token".into()),
            ..ClientConfig::with_base_url(mock_server.uri())
        })
        .unwrap();

        let user = client.get_user("U1").await.unwrap();
        assert_eq!(user.user_id, "U1");
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/workouts/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_workout("missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/exercises/E1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_exercise("E1")
            .await
            .unwrap_err();
        match err {
            ApiError::Transport { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "database offline");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quotes/random"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "QuoteId": "Q1", "QuoteText": "Lift." }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = FitnessClient::new(ClientConfig {
            timeout: Duration::from_millis(100),
            ..ClientConfig::with_base_url(mock_server.uri())
        })
        .unwrap();

        let err = client.get_random_quote().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/programs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).list_programs().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_retries_server_errors_when_configured() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/programs/P1"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = FitnessClient::new(ClientConfig {
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 5,
                max_delay_ms: 10,
                backoff_multiplier: 2.0,
            },
            ..ClientConfig::with_base_url(mock_server.uri())
        })
        .unwrap();

        let err = client.get_program("P1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_submit_program_feedback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/feedback/programs"))
            .and(body_json(json!({
                "UserId": "U1",
                "ProgramId": "P1",
                "TerminationReason": null,
                "ReasonDetails": null,
                "DifficultyRating": 3,
                "Improvements": [],
                "AdditionalFeedback": "Loved it",
                "FeedbackType": "Completion"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let feedback = ProgramFeedback {
            user_id: "U1".into(),
            program_id: "P1".into(),
            termination_reason: None,
            reason_details: None,
            difficulty_rating: 3,
            improvements: vec![],
            additional_feedback: Some("Loved it".into()),
            feedback_type: FeedbackType::Completion,
        };

        client_for(&mock_server)
            .submit_program_feedback(&feedback)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_feedback_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/feedback/programs"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FitnessClient::new(ClientConfig {
            retry: RetryConfig::with_max_retries(3),
            ..ClientConfig::with_base_url(mock_server.uri())
        })
        .unwrap();

        let feedback = ProgramFeedback {
            user_id: "U1".into(),
            program_id: "P1".into(),
            termination_reason: Some("Injury".into()),
            reason_details: None,
            difficulty_rating: 4,
            improvements: vec![],
            additional_feedback: None,
            feedback_type: FeedbackType::Termination,
        };

        let err = client.submit_program_feedback(&feedback).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}

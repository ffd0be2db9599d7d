use std::sync::Arc;

use fittrack_api::{FeedbackType, ProgramFeedback};
use fittrack_cache::{RequestStatus, RequestStore};
use tracing::info;

use crate::service::FitnessService;
use crate::{Error, Result};

/// Longest free-text answer accepted, in characters
pub const MAX_FEEDBACK_TEXT: usize = 2000;

pub const MAX_DIFFICULTY_RATING: u8 = 5;

/// Raw answers from the feedback form, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackInput {
    pub user_id: String,
    pub program_id: String,
    pub feedback_type: FeedbackType,
    pub termination_reason: Option<String>,
    pub reason_details: Option<String>,
    /// 1 (too easy) to 5 (too hard)
    pub difficulty_rating: u8,
    pub improvements: Vec<String>,
    pub additional_feedback: Option<String>,
}

impl FeedbackInput {
    /// Check the answers and build the wire payload
    ///
    /// Text is trimmed and blank answers become `None`.
    pub fn validate(self) -> Result<ProgramFeedback> {
        let user_id = required("user id", &self.user_id)?;
        let program_id = required("program id", &self.program_id)?;

        if !(1..=MAX_DIFFICULTY_RATING).contains(&self.difficulty_rating) {
            return Err(Error::Validation(format!(
                "difficulty rating must be between 1 and {}, got {}",
                MAX_DIFFICULTY_RATING, self.difficulty_rating
            )));
        }

        let termination_reason = optional_text("termination reason", self.termination_reason)?;
        if self.feedback_type == FeedbackType::Termination && termination_reason.is_none() {
            return Err(Error::Validation(
                "a termination reason is required when leaving a program".into(),
            ));
        }

        let improvements = self
            .improvements
            .into_iter()
            .map(|item| optional_text("improvement", Some(item)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        Ok(ProgramFeedback {
            user_id,
            program_id,
            termination_reason,
            reason_details: optional_text("reason details", self.reason_details)?,
            difficulty_rating: self.difficulty_rating,
            improvements,
            additional_feedback: optional_text("additional feedback", self.additional_feedback)?,
            feedback_type: self.feedback_type,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_FEEDBACK_TEXT {
        return Err(Error::Validation(format!(
            "{} is longer than {} characters",
            field, MAX_FEEDBACK_TEXT
        )));
    }
    Ok(Some(trimmed.to_string()))
}

fn submission_key(program_id: &str) -> String {
    program_id.trim().to_string()
}

/// Program feedback submissions, one status per program
pub struct FeedbackSlice {
    service: Arc<dyn FitnessService>,
    submissions: RequestStore<String, ()>,
}

impl FeedbackSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            submissions: RequestStore::new("program_feedback"),
        }
    }

    /// Validate and send feedback
    ///
    /// Invalid input is returned as an error and never reaches the network;
    /// a failed submission shows up as `Rejected` with the message stored.
    pub async fn submit_program_feedback(&self, input: FeedbackInput) -> Result<RequestStatus> {
        let feedback = input.validate()?;
        info!(program_id = %feedback.program_id, "Program feedback accepted for submission");

        let service = Arc::clone(&self.service);
        let key = submission_key(&feedback.program_id);
        let status = self
            .submissions
            .fetch(key, move || async move {
                service.submit_program_feedback(&feedback).await
            })
            .await;

        Ok(status)
    }

    /// Looked up by the trimmed id, the same key a submission is stored under
    pub fn status(&self, program_id: &str) -> RequestStatus {
        self.submissions.status(&submission_key(program_id))
    }

    pub fn error(&self, program_id: &str) -> Option<String> {
        self.submissions.error(&submission_key(program_id))
    }

    pub fn reset(&self) {
        self.submissions.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockFitnessService;
    use fittrack_api::ApiError;

    fn input() -> FeedbackInput {
        FeedbackInput {
            user_id: "U1".into(),
            program_id: "P1".into(),
            feedback_type: FeedbackType::Termination,
            termination_reason: Some("  Too time consuming ".into()),
            reason_details: Some("   ".into()),
            difficulty_rating: 4,
            improvements: vec!["Shorter sessions".into(), "".into()],
            additional_feedback: None,
        }
    }

    #[test]
    fn test_validate_normalises_text() {
        let feedback = input().validate().unwrap();
        assert_eq!(feedback.termination_reason.as_deref(), Some("Too time consuming"));
        assert_eq!(feedback.reason_details, None);
        assert_eq!(feedback.improvements, vec!["Shorter sessions"]);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let zero = FeedbackInput {
            difficulty_rating: 0,
            ..input()
        };
        assert!(matches!(zero.validate(), Err(Error::Validation(_))));

        let six = FeedbackInput {
            difficulty_rating: 6,
            ..input()
        };
        assert!(six.validate().is_err());

        let no_reason = FeedbackInput {
            termination_reason: None,
            ..input()
        };
        assert!(no_reason.validate().is_err());

        let no_user = FeedbackInput {
            user_id: " ".into(),
            ..input()
        };
        assert!(no_user.validate().is_err());

        let essay = FeedbackInput {
            additional_feedback: Some("x".repeat(MAX_FEEDBACK_TEXT + 1)),
            ..input()
        };
        assert!(essay.validate().is_err());
    }

    #[test]
    fn test_completion_needs_no_reason() {
        let completion = FeedbackInput {
            feedback_type: FeedbackType::Completion,
            termination_reason: None,
            ..input()
        };
        assert!(completion.validate().is_ok());
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut service = MockFitnessService::new();
        service
            .expect_submit_program_feedback()
            .withf(|feedback: &ProgramFeedback| {
                feedback.program_id == "P1" && feedback.difficulty_rating == 4
            })
            .times(1)
            .returning(|_| Ok(()));

        let slice = FeedbackSlice::new(Arc::new(service));
        let status = slice.submit_program_feedback(input()).await.unwrap();

        assert_eq!(status, RequestStatus::Fulfilled);
        assert_eq!(slice.status("P1"), RequestStatus::Fulfilled);
    }

    #[tokio::test]
    async fn test_invalid_input_skips_network() {
        let mut service = MockFitnessService::new();
        service.expect_submit_program_feedback().never();

        let slice = FeedbackSlice::new(Arc::new(service));
        let bad = FeedbackInput {
            difficulty_rating: 9,
            ..input()
        };

        assert!(slice.submit_program_feedback(bad).await.is_err());
        assert_eq!(slice.status("P1"), RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_submit_timeout_is_recorded() {
        let mut service = MockFitnessService::new();
        service.expect_submit_program_feedback().returning(|_| {
            Err(ApiError::Timeout {
                endpoint: "/feedback/programs".into(),
                seconds: 10,
            })
        });

        let slice = FeedbackSlice::new(Arc::new(service));
        let status = slice.submit_program_feedback(input()).await.unwrap();

        assert_eq!(status, RequestStatus::Rejected);
        assert!(slice.error("P1").unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_rejection_found_with_untrimmed_id() {
        let mut service = MockFitnessService::new();
        service
            .expect_submit_program_feedback()
            .returning(|_| Err(ApiError::Transport { status: 500, body: "oops".into() }));

        let slice = FeedbackSlice::new(Arc::new(service));
        let padded = FeedbackInput {
            program_id: " P1 ".into(),
            ..input()
        };
        let status = slice.submit_program_feedback(padded).await.unwrap();

        assert_eq!(status, RequestStatus::Rejected);
        assert_eq!(slice.status(" P1 "), RequestStatus::Rejected);
        assert!(slice.error(" P1 ").unwrap().contains("500"));
        assert_eq!(slice.error(" P1 "), slice.error("P1"));
    }
}

use async_trait::async_trait;
use fittrack_api::{
    Exercise, Program, ProgramDay, ProgramFeedback, Quote, Result, User, UserProgramProgress,
    Workout,
};

/// Everything the slices need from the backend
///
/// The HTTP client implements this in production; tests swap in a mock.
/// Errors stay as [`fittrack_api::ApiError`] so callers can still tell a
/// timeout from a transport failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FitnessService: Send + Sync {
    async fn get_program(&self, program_id: &str) -> Result<Program>;
    async fn list_programs(&self) -> Result<Vec<Program>>;
    async fn get_program_day(&self, program_id: &str, day_id: &str) -> Result<ProgramDay>;
    async fn get_workout(&self, workout_id: &str) -> Result<Workout>;
    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise>;
    async fn get_quote(&self, quote_id: &str) -> Result<Quote>;
    async fn get_random_quote(&self) -> Result<Quote>;
    async fn get_user(&self, user_id: &str) -> Result<User>;
    async fn get_user_program_progress(
        &self,
        user_id: &str,
        program_id: &str,
    ) -> Result<UserProgramProgress>;
    async fn submit_program_feedback(&self, feedback: &ProgramFeedback) -> Result<()>;
}

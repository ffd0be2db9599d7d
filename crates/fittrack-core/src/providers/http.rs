// HTTP service - bridges the REST client with the FitnessService trait
use async_trait::async_trait;
use fittrack_api::{
    ClientConfig, Exercise, FitnessClient, Program, ProgramDay, ProgramFeedback, Quote, Result,
    User, UserProgramProgress, Workout,
};

use crate::service::FitnessService;

/// Wrapper around FitnessClient that implements FitnessService
pub struct HttpFitnessService {
    client: FitnessClient,
}

impl HttpFitnessService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: FitnessClient::new(config)?,
        })
    }

    pub fn from_client(client: FitnessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FitnessService for HttpFitnessService {
    async fn get_program(&self, program_id: &str) -> Result<Program> {
        self.client.get_program(program_id).await
    }

    async fn list_programs(&self) -> Result<Vec<Program>> {
        self.client.list_programs().await
    }

    async fn get_program_day(&self, program_id: &str, day_id: &str) -> Result<ProgramDay> {
        self.client.get_program_day(program_id, day_id).await
    }

    async fn get_workout(&self, workout_id: &str) -> Result<Workout> {
        self.client.get_workout(workout_id).await
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise> {
        self.client.get_exercise(exercise_id).await
    }

    async fn get_quote(&self, quote_id: &str) -> Result<Quote> {
        self.client.get_quote(quote_id).await
    }

    async fn get_random_quote(&self) -> Result<Quote> {
        self.client.get_random_quote().await
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.client.get_user(user_id).await
    }

    async fn get_user_program_progress(
        &self,
        user_id: &str,
        program_id: &str,
    ) -> Result<UserProgramProgress> {
        self.client
            .get_user_program_progress(user_id, program_id)
            .await
    }

    async fn submit_program_feedback(&self, feedback: &ProgramFeedback) -> Result<()> {
        self.client.submit_program_feedback(feedback).await
    }
}

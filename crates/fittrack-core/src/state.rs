// Application state container - one per process, built at startup and passed around
use std::sync::Arc;

use fittrack_cache::SnapshotStore;
use tracing::info;

use crate::config::Config;
use crate::providers::HttpFitnessService;
use crate::service::FitnessService;
use crate::slices::{
    ExercisesSlice, FeedbackSlice, ProgramsSlice, QuotesSlice, UsersSlice, WorkoutsSlice,
};
use crate::Result;

/// Owns every slice; the UI only reads through the slice accessors
pub struct AppState {
    programs: ProgramsSlice,
    workouts: WorkoutsSlice,
    exercises: ExercisesSlice,
    quotes: QuotesSlice,
    users: UsersSlice,
    feedback: FeedbackSlice,
}

impl AppState {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            programs: ProgramsSlice::new(Arc::clone(&service)),
            workouts: WorkoutsSlice::new(Arc::clone(&service)),
            exercises: ExercisesSlice::new(Arc::clone(&service)),
            quotes: QuotesSlice::new(Arc::clone(&service)),
            users: UsersSlice::new(Arc::clone(&service)),
            feedback: FeedbackSlice::new(service),
        }
    }

    /// State backed by the real HTTP service
    pub fn from_config(config: &Config) -> Result<Self> {
        let service = HttpFitnessService::new(config.api.client_config())?;
        Ok(Self::new(Arc::new(service)))
    }

    pub fn programs(&self) -> &ProgramsSlice {
        &self.programs
    }

    pub fn workouts(&self) -> &WorkoutsSlice {
        &self.workouts
    }

    pub fn exercises(&self) -> &ExercisesSlice {
        &self.exercises
    }

    pub fn quotes(&self) -> &QuotesSlice {
        &self.quotes
    }

    pub fn users(&self) -> &UsersSlice {
        &self.users
    }

    pub fn feedback(&self) -> &FeedbackSlice {
        &self.feedback
    }

    /// Forget everything (logout). In-flight fetches will not write back.
    pub fn reset(&self) {
        self.programs.reset();
        self.workouts.reset();
        self.exercises.reset();
        self.quotes.reset();
        self.users.reset();
        self.feedback.reset();
        info!("Application state reset");
    }

    /// Write fulfilled programs, workouts, exercises and quotes to the snapshot
    pub fn persist(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let saved = self.programs.persist(snapshot)?
            + self.workouts.persist(snapshot)?
            + self.exercises.persist(snapshot)?
            + self.quotes.persist(snapshot)?;
        info!(saved, "State persisted to snapshot");
        Ok(saved)
    }

    /// Warm the slices from a snapshot; restored entries count as fulfilled
    pub fn restore(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let restored = self.programs.restore(snapshot)?
            + self.workouts.restore(snapshot)?
            + self.exercises.restore(snapshot)?
            + self.quotes.restore(snapshot)?;
        info!(restored, "State restored from snapshot");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockFitnessService;
    use crate::slices::fixtures::{exercise, program, quote, workout};
    use fittrack_cache::RequestStatus;

    fn mock_service() -> MockFitnessService {
        let mut service = MockFitnessService::new();
        service
            .expect_get_program()
            .returning(|id| Ok(program(id, "Strength 101")));
        service
            .expect_get_workout()
            .returning(|id| Ok(workout(id)));
        service
            .expect_get_exercise()
            .returning(|id| Ok(exercise(id)));
        service
            .expect_get_quote()
            .returning(|id| Ok(quote(id, "Show up.")));
        service
    }

    #[tokio::test]
    async fn test_slices_share_one_service() {
        let state = AppState::new(Arc::new(mock_service()));

        state.programs().fetch_program("P1").await;
        state.workouts().fetch_workout("W1").await;

        assert_eq!(state.programs().program_status("P1"), RequestStatus::Fulfilled);
        assert_eq!(state.workouts().status("W1"), RequestStatus::Fulfilled);
        assert_eq!(state.exercises().status("E1"), RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_clears_every_slice() {
        let state = AppState::new(Arc::new(mock_service()));
        state.programs().fetch_program("P1").await;
        state.quotes().fetch_quote("Q1").await;

        state.reset();

        assert_eq!(state.programs().program_status("P1"), RequestStatus::Idle);
        assert!(state.quotes().quote("Q1").is_none());
    }

    #[tokio::test]
    async fn test_reset_wins_over_late_response() {
        let state = AppState::new(Arc::new(mock_service()));

        let handle = state.programs().dispatch_program("P1");
        state.reset();
        handle.await;

        assert_eq!(state.programs().program_status("P1"), RequestStatus::Idle);
        assert!(state.programs().program("P1").is_none());
    }

    #[tokio::test]
    async fn test_persist_and_restore() {
        let state = AppState::new(Arc::new(mock_service()));
        state.programs().fetch_program("P1").await;
        state.workouts().fetch_workout("W1").await;
        state.exercises().fetch_exercise("E1").await;
        state.quotes().fetch_quote("Q1").await;

        let snapshot = SnapshotStore::in_memory().unwrap();
        assert_eq!(state.persist(&snapshot).unwrap(), 4);

        let offline = AppState::new(Arc::new(MockFitnessService::new()));
        assert_eq!(offline.restore(&snapshot).unwrap(), 4);
        assert_eq!(offline.exercises().status("E1"), RequestStatus::Fulfilled);
        assert_eq!(offline.quotes().quote("Q1").unwrap().quote_text, "Show up.");
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use fittrack_api::Exercise;
use fittrack_cache::{RequestStatus, RequestStore, SnapshotStore};
use futures::future::join_all;

use crate::service::FitnessService;
use crate::Result;

pub const EXERCISES_SNAPSHOT: &str = "exercises";

pub struct ExercisesSlice {
    service: Arc<dyn FitnessService>,
    exercises: RequestStore<String, Exercise>,
}

impl ExercisesSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            exercises: RequestStore::new("exercises"),
        }
    }

    pub async fn fetch_exercise(&self, exercise_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let id = exercise_id.to_string();
        self.exercises
            .fetch(id.clone(), move || async move {
                service.get_exercise(&id).await
            })
            .await
    }

    /// Fetch several exercises at once (a day's exercise list)
    ///
    /// Repeated ids share one request.
    pub async fn fetch_exercises(&self, exercise_ids: &[String]) -> HashMap<String, RequestStatus> {
        let fetches = exercise_ids.iter().map(|id| async move {
            let status = self.fetch_exercise(id).await;
            (id.clone(), status)
        });

        join_all(fetches).await.into_iter().collect()
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<Exercise> {
        self.exercises.entity(&exercise_id.to_string())
    }

    pub fn status(&self, exercise_id: &str) -> RequestStatus {
        self.exercises.status(&exercise_id.to_string())
    }

    pub fn error(&self, exercise_id: &str) -> Option<String> {
        self.exercises.error(&exercise_id.to_string())
    }

    pub fn reset(&self) {
        self.exercises.reset();
    }

    pub fn persist(&self, snapshot: &SnapshotStore) -> Result<usize> {
        Ok(snapshot.save_all(EXERCISES_SNAPSHOT, &self.exercises.fulfilled_entries())?)
    }

    pub fn restore(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let entries = snapshot.load_all::<Exercise>(EXERCISES_SNAPSHOT)?;
        let count = entries.len();
        for (id, exercise) in entries {
            self.exercises.insert_fulfilled(id, exercise);
        }
        Ok(count)
    }
}

use std::sync::Arc;

use fittrack_api::Workout;
use fittrack_cache::{RequestStatus, RequestStore, SnapshotStore};

use crate::service::FitnessService;
use crate::Result;

pub const WORKOUTS_SNAPSHOT: &str = "workouts";

pub struct WorkoutsSlice {
    service: Arc<dyn FitnessService>,
    workouts: RequestStore<String, Workout>,
}

impl WorkoutsSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            workouts: RequestStore::new("workouts"),
        }
    }

    pub async fn fetch_workout(&self, workout_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let id = workout_id.to_string();
        self.workouts
            .fetch(id.clone(), move || async move {
                service.get_workout(&id).await
            })
            .await
    }

    pub fn workout(&self, workout_id: &str) -> Option<Workout> {
        self.workouts.entity(&workout_id.to_string())
    }

    pub fn status(&self, workout_id: &str) -> RequestStatus {
        self.workouts.status(&workout_id.to_string())
    }

    pub fn error(&self, workout_id: &str) -> Option<String> {
        self.workouts.error(&workout_id.to_string())
    }

    pub fn reset(&self) {
        self.workouts.reset();
    }

    pub fn persist(&self, snapshot: &SnapshotStore) -> Result<usize> {
        Ok(snapshot.save_all(WORKOUTS_SNAPSHOT, &self.workouts.fulfilled_entries())?)
    }

    pub fn restore(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let entries = snapshot.load_all::<Workout>(WORKOUTS_SNAPSHOT)?;
        let count = entries.len();
        for (id, workout) in entries {
            self.workouts.insert_fulfilled(id, workout);
        }
        Ok(count)
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use fittrack_api::{User, UserProgramProgress};
use fittrack_cache::{NestedRequestStore, RequestStatus, RequestStore};

use crate::service::FitnessService;

/// User profiles and per-program progress
pub struct UsersSlice {
    service: Arc<dyn FitnessService>,
    users: RequestStore<String, User>,
    progress: NestedRequestStore<String, String, UserProgramProgress>,
}

impl UsersSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            users: RequestStore::new("users"),
            progress: NestedRequestStore::new("user_program_progress"),
        }
    }

    pub async fn fetch_user(&self, user_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let id = user_id.to_string();
        self.users
            .fetch(id.clone(), move || async move { service.get_user(&id).await })
            .await
    }

    pub async fn fetch_progress(&self, user_id: &str, program_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let (uid, pid) = (user_id.to_string(), program_id.to_string());
        self.progress
            .fetch(uid.clone(), pid.clone(), move || async move {
                service.get_user_program_progress(&uid, &pid).await
            })
            .await
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        self.users.entity(&user_id.to_string())
    }

    pub fn user_status(&self, user_id: &str) -> RequestStatus {
        self.users.status(&user_id.to_string())
    }

    pub fn user_error(&self, user_id: &str) -> Option<String> {
        self.users.error(&user_id.to_string())
    }

    pub fn progress(&self, user_id: &str, program_id: &str) -> Option<UserProgramProgress> {
        self.progress
            .entity(&user_id.to_string(), &program_id.to_string())
    }

    pub fn progress_status(&self, user_id: &str, program_id: &str) -> RequestStatus {
        self.progress
            .status(&user_id.to_string(), &program_id.to_string())
    }

    pub fn progress_error(&self, user_id: &str, program_id: &str) -> Option<String> {
        self.progress
            .error(&user_id.to_string(), &program_id.to_string())
    }

    /// Every program the user has progress cached for
    pub fn all_progress(&self, user_id: &str) -> HashMap<String, UserProgramProgress> {
        self.progress.entities_for(&user_id.to_string())
    }

    pub fn reset(&self) {
        self.users.reset();
        self.progress.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockFitnessService;
    use fittrack_api::ProgressStatus;

    fn progress(user_id: &str, program_id: &str, day: u32) -> UserProgramProgress {
        UserProgramProgress {
            user_id: user_id.to_string(),
            program_id: program_id.to_string(),
            current_day: day,
            start_date: None,
            last_activity_date: None,
            status: ProgressStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_progress_per_program() {
        let mut service = MockFitnessService::new();
        service
            .expect_get_user_program_progress()
            .times(2)
            .returning(|user_id, program_id| {
                let day = if program_id == "P1" { 3 } else { 11 };
                Ok(progress(user_id, program_id, day))
            });

        let slice = UsersSlice::new(Arc::new(service));
        slice.fetch_progress("U1", "P1").await;
        slice.fetch_progress("U1", "P2").await;

        assert_eq!(slice.progress("U1", "P1").unwrap().current_day, 3);
        assert_eq!(slice.progress("U1", "P2").unwrap().current_day, 11);
        assert_eq!(slice.progress_status("U2", "P1"), RequestStatus::Idle);
        assert_eq!(slice.all_progress("U1").len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let mut service = MockFitnessService::new();
        service.expect_get_user().returning(|id| {
            Ok(User {
                user_id: id.to_string(),
                first_name: Some("Sam".into()),
                last_name: None,
                email: None,
                preferred_unit: Some("lb".into()),
            })
        });

        let slice = UsersSlice::new(Arc::new(service));
        assert_eq!(slice.fetch_user("U1").await, RequestStatus::Fulfilled);
        assert_eq!(slice.user("U1").unwrap().first_name.as_deref(), Some("Sam"));
        assert!(slice.user_error("U1").is_none());
    }
}

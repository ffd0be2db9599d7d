use std::collections::HashMap;
use std::sync::Arc;

use fittrack_api::{Program, ProgramDay};
use fittrack_cache::{FetchHandle, NestedRequestStore, RequestStatus, RequestStore, SnapshotStore};
use tracing::debug;

use super::Singleton;
use crate::service::FitnessService;
use crate::Result;

pub const PROGRAMS_SNAPSHOT: &str = "programs";

/// Programs, the program catalog and per-program days
pub struct ProgramsSlice {
    service: Arc<dyn FitnessService>,
    programs: RequestStore<String, Program>,
    catalog: RequestStore<Singleton, Vec<String>>,
    days: NestedRequestStore<String, String, ProgramDay>,
}

impl ProgramsSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            programs: RequestStore::new("programs"),
            catalog: RequestStore::new("program_catalog"),
            days: NestedRequestStore::new("program_days"),
        }
    }

    /// Start loading one program; status is `Pending` once this returns
    pub fn dispatch_program(&self, program_id: &str) -> FetchHandle {
        let service = Arc::clone(&self.service);
        let id = program_id.to_string();
        self.programs.dispatch(id.clone(), move || async move {
            service.get_program(&id).await
        })
    }

    pub async fn fetch_program(&self, program_id: &str) -> RequestStatus {
        self.dispatch_program(program_id).await
    }

    /// Start loading the catalog; every listed program becomes fulfilled too
    ///
    /// Programs arriving after a `reset` are dropped along with the catalog.
    pub fn dispatch_catalog(&self) -> FetchHandle {
        let service = Arc::clone(&self.service);
        let programs = self.programs.clone();
        let generation = programs.generation();
        self.catalog.dispatch(Singleton, move || async move {
            let listed = service.list_programs().await?;
            debug!(count = listed.len(), "Program catalog received");
            let ids = listed.iter().map(|p| p.program_id.clone()).collect();
            for program in listed {
                programs.insert_fulfilled_if_current(
                    generation,
                    program.program_id.clone(),
                    program,
                );
            }
            Ok::<Vec<String>, fittrack_api::ApiError>(ids)
        })
    }

    pub async fn fetch_catalog(&self) -> RequestStatus {
        self.dispatch_catalog().await
    }

    pub async fn fetch_program_day(&self, program_id: &str, day_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let (pid, did) = (program_id.to_string(), day_id.to_string());
        self.days
            .fetch(pid.clone(), did.clone(), move || async move {
                service.get_program_day(&pid, &did).await
            })
            .await
    }

    pub fn program(&self, program_id: &str) -> Option<Program> {
        self.programs.entity(&program_id.to_string())
    }

    pub fn program_status(&self, program_id: &str) -> RequestStatus {
        self.programs.status(&program_id.to_string())
    }

    pub fn program_error(&self, program_id: &str) -> Option<String> {
        self.programs.error(&program_id.to_string())
    }

    /// Catalog in server order; programs evicted since are skipped
    pub fn catalog(&self) -> Vec<Program> {
        self.catalog
            .entity(&Singleton)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.programs.entity(id))
            .collect()
    }

    /// Every program held locally, sorted by id
    pub fn cached_programs(&self) -> Vec<Program> {
        let mut programs: Vec<Program> = self
            .programs
            .fulfilled_entries()
            .into_iter()
            .map(|(_, program)| program)
            .collect();
        programs.sort_by(|a, b| a.program_id.cmp(&b.program_id));
        programs
    }

    pub fn catalog_status(&self) -> RequestStatus {
        self.catalog.status(&Singleton)
    }

    pub fn catalog_error(&self) -> Option<String> {
        self.catalog.error(&Singleton)
    }

    pub fn day(&self, program_id: &str, day_id: &str) -> Option<ProgramDay> {
        self.days
            .entity(&program_id.to_string(), &day_id.to_string())
    }

    pub fn day_status(&self, program_id: &str, day_id: &str) -> RequestStatus {
        self.days
            .status(&program_id.to_string(), &day_id.to_string())
    }

    pub fn day_error(&self, program_id: &str, day_id: &str) -> Option<String> {
        self.days.error(&program_id.to_string(), &day_id.to_string())
    }

    pub fn day_statuses(&self, program_id: &str) -> HashMap<String, RequestStatus> {
        self.days.statuses_for(&program_id.to_string())
    }

    pub fn reset(&self) {
        self.programs.reset();
        self.catalog.reset();
        self.days.reset();
    }

    pub fn persist(&self, snapshot: &SnapshotStore) -> Result<usize> {
        Ok(snapshot.save_all(PROGRAMS_SNAPSHOT, &self.programs.fulfilled_entries())?)
    }

    pub fn restore(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let entries = snapshot.load_all::<Program>(PROGRAMS_SNAPSHOT)?;
        let count = entries.len();
        for (id, program) in entries {
            self.programs.insert_fulfilled(id, program);
        }
        Ok(count)
    }
}

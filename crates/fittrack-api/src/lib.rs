// HTTP adapter for the fitness REST backend
pub mod client;
pub mod error;
pub mod models;
pub mod retry;

// Re-export common types
pub use client::{ClientConfig, FitnessClient, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, ErrorKind, Result};
pub use models::{
    CalendarOverviewItem, DayExercise, Exercise, FeedbackType, MuscleGroups, Program, ProgramDay,
    ProgramFeedback, ProgressStatus, Quote, User, UserProgramProgress, Workout,
};
pub use retry::RetryConfig;

// Client-side data layer: slices, service boundary, config and unit helpers
pub mod config;
pub mod error;
pub mod providers;
pub mod service;
pub mod slices;
pub mod state;
pub mod units;

pub use config::Config;
pub use error::Error;
pub use providers::HttpFitnessService;
pub use service::FitnessService;
pub use slices::{
    ExercisesSlice, FeedbackInput, FeedbackSlice, ProgramsSlice, QuotesSlice, UsersSlice,
    WorkoutsSlice,
};
pub use state::AppState;
pub use units::{to_kg, to_pounds, WeightUnit};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;

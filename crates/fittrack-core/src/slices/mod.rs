// Domain slices: one partition of client state per entity type
pub mod exercises;
pub mod feedback;
pub mod programs;
pub mod quotes;
pub mod users;
pub mod workouts;

pub use exercises::ExercisesSlice;
pub use feedback::{FeedbackInput, FeedbackSlice, MAX_FEEDBACK_TEXT};
pub use programs::ProgramsSlice;
pub use quotes::QuotesSlice;
pub use users::UsersSlice;
pub use workouts::WorkoutsSlice;

/// Key for stores that only ever hold one value (catalog, current quote)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Singleton;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Training program as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Program {
    pub program_id: String,
    pub program_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub goal: String,
    /// Total training days in the program
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub weeks: u32,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub calendar_overview: Vec<CalendarOverviewItem>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One row of a program's calendar summary ("Week 1", "Deload", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarOverviewItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// A single day inside a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramDay {
    pub program_id: String,
    pub day_id: String,
    #[serde(default)]
    pub day_title: String,
    #[serde(default)]
    pub day_description: String,
    #[serde(default)]
    pub rest_day: bool,
    /// Estimated session length in minutes
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<DayExercise>,
}

/// Prescription for one exercise within a day or workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayExercise {
    pub exercise_id: String,
    #[serde(default)]
    pub sets: u32,
    /// Kept as text because the backend sends ranges like "8-12"
    #[serde(default)]
    pub reps: String,
    /// Rest between sets, seconds
    #[serde(default)]
    pub rest: Option<u32>,
    /// Suggested load in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workout {
    pub workout_id: String,
    pub workout_name: String,
    #[serde(default)]
    pub description: String,
    /// Minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub exercises: Vec<DayExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Exercise {
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub muscle_groups: MuscleGroups,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MuscleGroups {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quote {
    pub quote_id: String,
    pub quote_text: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// "kg" or "lb"
    #[serde(default)]
    pub preferred_unit: Option<String>,
}

/// Where a user stands in a program they have started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProgramProgress {
    pub user_id: String,
    pub program_id: String,
    #[serde(default)]
    pub current_day: u32,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgressStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// Why the feedback is being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackType {
    /// User quit the program early
    Termination,
    /// User finished the program
    Completion,
    General,
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackType::Termination => write!(f, "Termination"),
            FeedbackType::Completion => write!(f, "Completion"),
            FeedbackType::General => write!(f, "General"),
        }
    }
}

/// Body of `POST /feedback/programs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramFeedback {
    pub user_id: String,
    pub program_id: String,
    pub termination_reason: Option<String>,
    pub reason_details: Option<String>,
    pub difficulty_rating: u8,
    pub improvements: Vec<String>,
    pub additional_feedback: Option<String>,
    pub feedback_type: FeedbackType,
}

use serde::{Deserialize, Serialize};

/// Lifecycle of a keyed fetch
///
/// Any state may move back to `Pending` when the key is fetched again,
/// so none of them is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Never fetched (or reset)
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(self) -> bool {
        self == RequestStatus::Pending
    }

    /// Fulfilled or rejected
    pub fn is_settled(self) -> bool {
        matches!(self, RequestStatus::Fulfilled | RequestStatus::Rejected)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Fulfilled => write!(f, "fulfilled"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

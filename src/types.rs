//! Common types used throughout the activity service

use serde::{Deserialize, Serialize};

/// Activity names double as their identifiers
pub type ActivityName = String;

/// Student email address as submitted
pub type StudentEmail = String;

/// Snapshot of one extracurricular activity and its roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: ActivityName,
    pub description: String,
    pub schedule: String,
    pub max_participants: usize,
    /// Signup order
    pub participants: Vec<StudentEmail>,
}

impl Activity {
    pub fn current_participants(&self) -> usize {
        self.participants.len()
    }

    pub fn spots_left(&self) -> usize {
        self.max_participants.saturating_sub(self.participants.len())
    }
}

/// Response body of a successful signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupConfirmation {
    pub message: String,
    pub current_participants: usize,
    pub max_participants: usize,
}

/// Body of every client error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

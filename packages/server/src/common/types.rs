use serde::{Deserialize, Serialize};

/// Which side of an interview pair a request fills.
///
/// A request only ever matches against requests of the opposite role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Candidate,
    Interviewer,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Role::Candidate => Role::Interviewer,
            Role::Interviewer => Role::Candidate,
        }
    }
}

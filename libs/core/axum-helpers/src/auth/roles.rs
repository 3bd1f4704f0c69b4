use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles, one per user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform owner; manages accounts and sees everything
    MainAdmin,
    /// Creates and runs events
    Organizer,
    /// Helps run the events they are assigned to
    StudentCoordinator,
    #[default]
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::MainAdmin,
        Role::Organizer,
        Role::StudentCoordinator,
        Role::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MainAdmin => "MAIN_ADMIN",
            Role::Organizer => "ORGANIZER",
            Role::StudentCoordinator => "STUDENT_COORDINATOR",
            Role::Student => "STUDENT",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::MainAdmin)
    }

    /// Everyone except students
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Student)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

//! Registrant lookup.
//!
//! The events domain does not own accounts. The application supplies a
//! [`ParticipantDirectory`] backed by whatever stores users.

use async_trait::async_trait;
use axum_helpers::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventResult;
use crate::models::ProfileField;

/// Account and profile of a would-be registrant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub year_of_study: Option<u8>,
    pub roll_number: Option<String>,
    pub college: Option<String>,
}

impl Participant {
    pub fn has(&self, field: ProfileField) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match field {
            ProfileField::Phone => filled(&self.phone),
            ProfileField::Department => filled(&self.department),
            ProfileField::YearOfStudy => self.year_of_study.is_some(),
            ProfileField::RollNumber => filled(&self.roll_number),
            ProfileField::College => filled(&self.college),
        }
    }

    /// Required fields this participant has not filled in, in order
    pub fn missing(&self, required: &[ProfileField]) -> Vec<ProfileField> {
        required.iter().copied().filter(|f| !self.has(*f)).collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// `None` for unknown or disabled accounts
    async fn participant(&self, user_id: Uuid) -> EventResult<Option<Participant>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_ignore_blank_values() {
        let participant = Participant {
            phone: Some("  ".into()),
            department: Some("CSE".into()),
            year_of_study: Some(3),
            ..Default::default()
        };

        let missing = participant.missing(&[
            ProfileField::Phone,
            ProfileField::Department,
            ProfileField::YearOfStudy,
            ProfileField::College,
        ]);
        assert_eq!(missing, vec![ProfileField::Phone, ProfileField::College]);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Inbox state of a message
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageStatus {
    /// Not yet opened by an admin
    #[default]
    New,
    Read,
    Resolved,
}

/// A message sent through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactMessage {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContactMessage {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 10, max = 5000))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetMessageStatus {
    pub status: MessageStatus,
}

/// Query filters for the admin inbox
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, IntoParams)]
pub struct ContactFilter {
    pub status: Option<MessageStatus>,
    /// Case-insensitive match on name, email or subject
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ContactFilter {
    /// In-memory equivalent of the MongoDB filter
    pub fn matches(&self, message: &ContactMessage) -> bool {
        if self.status.is_some_and(|s| message.status != s) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(search) => {
                let search = search.to_lowercase();
                [&message.name, &message.email, &message.subject]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&search))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactList {
    pub items: Vec<ContactMessage>,
    pub total: u64,
}

impl ContactMessage {
    /// Trimmed, with the email lowercased
    pub fn new(input: CreateContactMessage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            subject: input.subject.trim().to_string(),
            message: input.message.trim().to_string(),
            status: MessageStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: MessageStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateContactMessage {
        CreateContactMessage {
            name: " Ada ".into(),
            email: "Ada@Campus.EDU".into(),
            subject: "Venue question".into(),
            message: "Is the hall wheelchair accessible?".into(),
        }
    }

    #[test]
    fn test_new_message_is_normalized() {
        let message = ContactMessage::new(input());
        assert_eq!(message.name, "Ada");
        assert_eq!(message.email, "ada@campus.edu");
        assert_eq!(message.status, MessageStatus::New);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(input().validate().is_ok());

        let short = CreateContactMessage {
            message: "Hi".into(),
            ..input()
        };
        assert!(short.validate().is_err());

        let bad_email = CreateContactMessage {
            email: "nope".into(),
            ..input()
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_filter_matches_status_and_search() {
        let message = ContactMessage::new(input());

        assert!(ContactFilter::default().matches(&message));
        assert!(
            ContactFilter {
                search: Some("VENUE".into()),
                ..Default::default()
            }
            .matches(&message)
        );
        assert!(
            !ContactFilter {
                status: Some(MessageStatus::Resolved),
                ..Default::default()
            }
            .matches(&message)
        );
    }
}

//! Registration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{EventStatus, RegistrationKind};
use crate::participants::Participant;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Cancelled,
    Attended,
}

impl RegistrationStatus {
    /// Registered or attended
    pub fn is_active(&self) -> bool {
        !matches!(self, RegistrationStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TeamMember {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub roll_number: Option<String>,
}

/// Team entry; `members` excludes the registering student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Team {
    #[validate(length(max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub members: Vec<TeamMember>,
}

/// A student's (or team's) enrollment in an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Registration {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub participant_name: String,
    pub participant_email: String,
    pub kind: RegistrationKind,
    pub team: Option<Team>,
    pub status: RegistrationStatus,
    pub attended_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        event_id: Uuid,
        participant: &Participant,
        kind: RegistrationKind,
        team: Option<Team>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            event_id,
            user_id: participant.id,
            participant_name: participant.name.clone(),
            participant_email: participant.email.clone(),
            kind,
            team,
            status: RegistrationStatus::Registered,
            attended_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bring a cancelled registration back instead of creating a second one.
    /// Kind and registrant details follow the event and account as they are now.
    pub fn reactivate(
        &mut self,
        participant: &Participant,
        kind: RegistrationKind,
        team: Option<Team>,
    ) {
        self.participant_name = participant.name.clone();
        self.participant_email = participant.email.clone();
        self.kind = kind;
        self.status = RegistrationStatus::Registered;
        self.team = team;
        self.cancelled_at = None;
        self.attended_at = None;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        let now = Utc::now();
        self.status = RegistrationStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_attended(&mut self, attended: bool) {
        let now = Utc::now();
        if attended {
            self.status = RegistrationStatus::Attended;
            self.attended_at = Some(now);
        } else {
            self.status = RegistrationStatus::Registered;
            self.attended_at = None;
        }
        self.updated_at = now;
    }
}

/// Body of `POST /events/{id}/registrations`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterForEvent {
    #[validate(nested)]
    pub team: Option<Team>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AttendanceUpdate {
    pub attended: bool,
}

/// A registration with the event details a student's dashboard shows
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyRegistration {
    pub registration: Registration,
    pub event_title: String,
    pub event_status: EventStatus,
    pub event_starts_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CertificateEligibility {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub eligible: bool,
    /// Why not, when not eligible
    pub reasons: Vec<String>,
}

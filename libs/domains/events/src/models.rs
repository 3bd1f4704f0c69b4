//! Event domain models

use chrono::{DateTime, Utc};
use database::mongodb::fixed_rfc3339;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

/// Lifecycle state
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Draft,
        EventStatus::Published,
        EventStatus::Cancelled,
        EventStatus::Completed,
    ];

    /// Cancelled and completed events are frozen
    pub fn is_final(&self) -> bool {
        matches!(self, EventStatus::Cancelled | EventStatus::Completed)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventCategory {
    Technical,
    Cultural,
    Sports,
    Workshop,
    Seminar,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    #[serde(with = "fixed_rfc3339")]
    pub starts_at: DateTime<Utc>,
    #[serde(with = "fixed_rfc3339")]
    pub ends_at: DateTime<Utc>,
    /// Registration closes at `starts_at` when unset
    #[serde(default, with = "fixed_rfc3339::option")]
    pub registration_deadline: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn registration_closes_at(&self) -> DateTime<Utc> {
        self.registration_deadline.unwrap_or(self.starts_at)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VenueMode {
    #[default]
    Offline,
    Online,
    Hybrid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Venue {
    pub mode: VenueMode,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(url)]
    pub meeting_url: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationKind {
    #[default]
    Individual,
    Team,
}

/// Student profile entries an event can require before registration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProfileField {
    Phone,
    Department,
    YearOfStudy,
    RollNumber,
    College,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationSettings {
    #[serde(default)]
    pub kind: RegistrationKind,
    /// Unlimited when unset; a team counts as one entry
    pub capacity: Option<u32>,
    #[serde(default = "default_min_team_size")]
    pub min_team_size: u32,
    #[serde(default = "default_max_team_size")]
    pub max_team_size: u32,
    #[serde(default = "default_true")]
    pub is_open: bool,
    #[serde(default)]
    pub required_fields: Vec<ProfileField>,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            kind: RegistrationKind::Individual,
            capacity: None,
            min_team_size: default_min_team_size(),
            max_team_size: default_max_team_size(),
            is_open: true,
            required_fields: Vec::new(),
        }
    }
}

fn default_min_team_size() -> u32 {
    1
}

fn default_max_team_size() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CertificateSettings {
    pub enabled: bool,
    pub requires_attendance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct FeedbackSettings {
    pub enabled: bool,
    #[validate(url)]
    pub form_url: Option<String>,
}

/// Campus event document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub status: EventStatus,
    /// Organizer (or admin) who owns the event
    pub created_by: Uuid,
    #[serde(default)]
    pub coordinators: Vec<Uuid>,
    pub banner_url: Option<String>,
    pub schedule: Option<Schedule>,
    pub venue: Option<Venue>,
    #[serde(default)]
    pub registration: RegistrationSettings,
    #[serde(default)]
    pub certificate: CertificateSettings,
    #[serde(default)]
    pub feedback: FeedbackSettings,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// New drafts start unpublished and owned by `created_by`
    pub fn new(input: CreateEvent, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            category: input.category,
            status: EventStatus::Draft,
            created_by,
            coordinators: Vec::new(),
            banner_url: input.banner_url,
            schedule: input.schedule,
            venue: input.venue,
            registration: input.registration.unwrap_or_default(),
            certificate: input.certificate.unwrap_or_default(),
            feedback: input.feedback.unwrap_or_default(),
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, input: UpdateEvent) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            self.description = description.trim().to_string();
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(banner_url) = input.banner_url {
            self.banner_url = Some(banner_url).filter(|u| !u.trim().is_empty());
        }
        if let Some(schedule) = input.schedule {
            self.schedule = Some(schedule);
        }
        if let Some(venue) = input.venue {
            self.venue = Some(venue);
        }
        if let Some(registration) = input.registration {
            self.registration = registration;
        }
        if let Some(certificate) = input.certificate {
            self.certificate = certificate;
        }
        if let Some(feedback) = input.feedback {
            self.feedback = feedback;
        }
        self.updated_at = Utc::now();
    }

    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.schedule.as_ref().map(|s| s.starts_at)
    }

    pub fn is_coordinator(&self, user_id: Uuid) -> bool {
        self.coordinators.contains(&user_id)
    }

    /// Everything that keeps this event from being published
    pub fn publish_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title is required".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("description is required".to_string());
        }

        match &self.schedule {
            None => problems.push("schedule is required".to_string()),
            Some(schedule) => {
                if schedule.starts_at >= schedule.ends_at {
                    problems.push("schedule must end after it starts".to_string());
                }
                if schedule
                    .registration_deadline
                    .is_some_and(|deadline| deadline > schedule.starts_at)
                {
                    problems.push("registration deadline must not be after the start".to_string());
                }
            }
        }

        match &self.venue {
            None => problems.push("venue is required".to_string()),
            Some(venue) => {
                let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
                if matches!(venue.mode, VenueMode::Offline | VenueMode::Hybrid) && !has(&venue.name)
                {
                    problems.push("venue name is required for offline and hybrid events".to_string());
                }
                if matches!(venue.mode, VenueMode::Online | VenueMode::Hybrid)
                    && !has(&venue.meeting_url)
                {
                    problems.push("meeting URL is required for online and hybrid events".to_string());
                }
            }
        }

        let registration = &self.registration;
        if registration.capacity == Some(0) {
            problems.push("capacity must be at least 1".to_string());
        }
        if registration.kind == RegistrationKind::Team
            && (registration.min_team_size < 1
                || registration.min_team_size > registration.max_team_size)
        {
            problems.push("team sizes must satisfy 1 <= min <= max".to_string());
        }

        if self.feedback.enabled && self.feedback.form_url.is_none() {
            problems.push("feedback form URL is required when feedback is enabled".to_string());
        }

        problems
    }
}

/// New event; drafts may be incomplete until published
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub category: EventCategory,
    #[validate(url)]
    pub banner_url: Option<String>,
    pub schedule: Option<Schedule>,
    #[validate(nested)]
    pub venue: Option<Venue>,
    pub registration: Option<RegistrationSettings>,
    pub certificate: Option<CertificateSettings>,
    #[validate(nested)]
    pub feedback: Option<FeedbackSettings>,
}

/// Partial update; present sections replace the stored ones
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub category: Option<EventCategory>,
    /// Blank removes the banner
    #[validate(custom(function = "url_or_blank"))]
    pub banner_url: Option<String>,
    pub schedule: Option<Schedule>,
    #[validate(nested)]
    pub venue: Option<Venue>,
    pub registration: Option<RegistrationSettings>,
    pub certificate: Option<CertificateSettings>,
    #[validate(nested)]
    pub feedback: Option<FeedbackSettings>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignCoordinators {
    pub coordinators: Vec<Uuid>,
}

fn url_or_blank(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() || url.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Query filters for listing events
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema, IntoParams)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    /// Case-insensitive match on title or description
    pub search: Option<String>,
    /// Only events that have not started yet
    pub upcoming: Option<bool>,
    /// Only events created by the caller
    pub mine: Option<bool>,
    /// Only events the caller coordinates
    pub assigned: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            status: None,
            category: None,
            search: None,
            upcoming: None,
            mine: None,
            assigned: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Which drafts a viewer may see; non-draft events are always visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftScope {
    None,
    OwnedBy(Uuid),
    CoordinatedBy(Uuid),
    All,
}

/// Repository-level query: the filter resolved against a viewer
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub drafts: DraftScope,
    pub status: Option<EventStatus>,
    pub category: Option<EventCategory>,
    pub search: Option<String>,
    pub starts_after: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub coordinator: Option<Uuid>,
    pub limit: i64,
    pub offset: u64,
}

impl EventQuery {
    /// Every event, for internal callers
    pub fn all() -> Self {
        Self {
            drafts: DraftScope::All,
            status: None,
            category: None,
            search: None,
            starts_after: None,
            created_by: None,
            coordinator: None,
            limit: default_limit(),
            offset: 0,
        }
    }

    /// In-memory equivalent of the MongoDB filter
    pub fn matches(&self, event: &Event) -> bool {
        let visible = event.status != EventStatus::Draft
            || match self.drafts {
                DraftScope::None => false,
                DraftScope::OwnedBy(id) => event.created_by == id,
                DraftScope::CoordinatedBy(id) => event.is_coordinator(id),
                DraftScope::All => true,
            };
        if !visible {
            return false;
        }
        if self.status.is_some_and(|s| event.status != s) {
            return false;
        }
        if self.category.is_some_and(|c| event.category != c) {
            return false;
        }
        if let Some(search) = self.search.as_deref().map(str::to_lowercase) {
            if !event.title.to_lowercase().contains(&search)
                && !event.description.to_lowercase().contains(&search)
            {
                return false;
            }
        }
        if let Some(after) = self.starts_after {
            if !event.starts_at().is_some_and(|start| start > after) {
                return false;
            }
        }
        if self.created_by.is_some_and(|id| event.created_by != id) {
            return false;
        }
        if self.coordinator.is_some_and(|id| !event.is_coordinator(id)) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventList {
    pub items: Vec<Event>,
    pub total: u64,
}

/// Seats and counts for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub event_id: Uuid,
    pub status: EventStatus,
    /// Active registrations (teams count once)
    pub registered: u64,
    pub attended: u64,
    pub capacity: Option<u32>,
    pub seats_left: Option<u64>,
    pub is_registration_open: bool,
}

/// Events per status, for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventStats {
    pub draft: u64,
    pub published: u64,
    pub cancelled: u64,
    pub completed: u64,
}

impl EventStats {
    pub fn set(&mut self, status: EventStatus, count: u64) {
        match status {
            EventStatus::Draft => self.draft = count,
            EventStatus::Published => self.published = count,
            EventStatus::Cancelled => self.cancelled = count,
            EventStatus::Completed => self.completed = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.draft + self.published + self.cancelled + self.completed
    }
}

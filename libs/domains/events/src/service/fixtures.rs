//! Shared setup for service and handler tests

use axum_helpers::{CurrentUser, Role};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::EventService;
use crate::models::{CreateEvent, Event, EventCategory, Schedule, Venue, VenueMode};
use crate::participants::{MockParticipantDirectory, Participant, ParticipantDirectory};
use crate::repository::{EventRepository, InMemoryEventRepository, InMemoryRegistrationRepository};

pub(crate) type TestService = EventService<InMemoryEventRepository, InMemoryRegistrationRepository>;

pub(crate) struct Harness {
    pub service: TestService,
    pub events: InMemoryEventRepository,
    pub registrations: InMemoryRegistrationRepository,
    pub admin: CurrentUser,
    pub organizer: CurrentUser,
    pub other_organizer: CurrentUser,
    pub coordinator: CurrentUser,
    pub student: CurrentUser,
    pub second_student: CurrentUser,
    pub incomplete_student: CurrentUser,
}

pub(crate) fn user(role: Role, name: &str) -> CurrentUser {
    CurrentUser {
        id: Uuid::now_v7(),
        email: format!("{}@campus.edu", name.to_lowercase()),
        name: name.to_string(),
        role,
    }
}

fn participant(user: &CurrentUser, complete: bool) -> Participant {
    let mut participant = Participant {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        ..Default::default()
    };
    if complete {
        participant.phone = Some("9876543210".into());
        participant.department = Some("CSE".into());
        participant.year_of_study = Some(3);
        participant.roll_number = Some(format!("R-{}", user.name));
        participant.college = Some("Campus Institute".into());
    }
    participant
}

/// Directory over a fixed set of participants
pub(crate) fn directory(participants: Vec<Participant>) -> Arc<dyn ParticipantDirectory> {
    let mut mock = MockParticipantDirectory::new();
    mock.expect_participant()
        .returning(move |id| Ok(participants.iter().find(|p| p.id == id).cloned()));
    Arc::new(mock)
}

pub(crate) fn harness() -> Harness {
    let admin = user(Role::MainAdmin, "Admin");
    let organizer = user(Role::Organizer, "Grace");
    let other_organizer = user(Role::Organizer, "Linus");
    let coordinator = user(Role::StudentCoordinator, "Coord");
    let student = user(Role::Student, "Ada");
    let second_student = user(Role::Student, "Alan");
    let incomplete_student = user(Role::Student, "Barbara");

    let participants = vec![
        participant(&admin, false),
        participant(&organizer, false),
        participant(&other_organizer, false),
        participant(&coordinator, true),
        participant(&student, true),
        participant(&second_student, true),
        participant(&incomplete_student, false),
    ];

    let events = InMemoryEventRepository::new();
    let registrations = InMemoryRegistrationRepository::new();
    let service = EventService::new(events.clone(), registrations.clone(), directory(participants));

    Harness {
        service,
        events,
        registrations,
        admin,
        organizer,
        other_organizer,
        coordinator,
        student,
        second_student,
        incomplete_student,
    }
}

/// Publishable offline event a week out
pub(crate) fn complete_input() -> CreateEvent {
    let starts_at = Utc::now() + Duration::days(7);
    CreateEvent {
        title: "HackNight".into(),
        description: "Overnight hackathon".into(),
        category: EventCategory::Technical,
        banner_url: None,
        schedule: Some(Schedule {
            starts_at,
            ends_at: starts_at + Duration::hours(12),
            registration_deadline: Some(starts_at - Duration::days(1)),
        }),
        venue: Some(Venue {
            mode: VenueMode::Offline,
            name: Some("Main Hall".into()),
            address: None,
            meeting_url: None,
        }),
        registration: None,
        certificate: None,
        feedback: None,
    }
}

pub(crate) async fn published_event(h: &Harness) -> Event {
    published_event_with(h, |_| {}).await
}

/// Organizer-owned event, adjusted by `tweak` and published
pub(crate) async fn published_event_with(h: &Harness, tweak: impl FnOnce(&mut CreateEvent)) -> Event {
    let mut input = complete_input();
    tweak(&mut input);
    let draft = h.service.create_event(&h.organizer, input).await.unwrap();
    h.service.publish_event(&h.organizer, draft.id).await.unwrap()
}

/// Move the stored event's start into the past
pub(crate) async fn start_event(h: &Harness, id: Uuid) {
    let mut event = h.events.get_by_id(id).await.unwrap().unwrap();
    let now = Utc::now();
    event.schedule = Some(Schedule {
        starts_at: now - Duration::hours(1),
        ends_at: now + Duration::hours(2),
        registration_deadline: None,
    });
    h.events.update(event).await.unwrap();
}

//! Registration flow: sign-up, cancellation, attendance and certificates

use axum_helpers::{CurrentUser, Role};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{EventService, can_staff};
use crate::error::{EventError, EventResult};
use crate::models::{Event, EventStatus, RegistrationKind, RegistrationSettings};
use crate::participants::Participant;
use crate::registration::{
    CertificateEligibility, MyRegistration, RegisterForEvent, Registration, RegistrationStatus,
    Team,
};
use crate::repository::{EventRepository, RegistrationRepository};

/// Check the team payload against the event's settings and normalize it
pub fn validate_team(
    settings: &RegistrationSettings,
    registrant: &Participant,
    team: Option<Team>,
) -> EventResult<Option<Team>> {
    match (settings.kind, team) {
        (RegistrationKind::Individual, None) => Ok(None),
        (RegistrationKind::Individual, Some(_)) => Err(EventError::Validation(
            "This event takes individual registrations only".to_string(),
        )),
        (RegistrationKind::Team, None) => Err(EventError::Validation(
            "Team details are required for this event".to_string(),
        )),
        (RegistrationKind::Team, Some(mut team)) => {
            team.name = team.name.trim().to_string();
            if team.name.is_empty() {
                return Err(EventError::Validation("Team name is required".to_string()));
            }

            let size = team.members.len() as u32 + 1;
            if size < settings.min_team_size || size > settings.max_team_size {
                return Err(EventError::Validation(format!(
                    "Team size must be between {} and {} including you",
                    settings.min_team_size, settings.max_team_size
                )));
            }

            let mut emails = HashSet::new();
            emails.insert(registrant.email.trim().to_lowercase());
            for member in &mut team.members {
                member.name = member.name.trim().to_string();
                member.email = member.email.trim().to_lowercase();
                if !emails.insert(member.email.clone()) {
                    return Err(EventError::Validation(
                        "Team member emails must be unique".to_string(),
                    ));
                }
            }

            Ok(Some(team))
        }
    }
}

impl<E: EventRepository, G: RegistrationRepository> EventService<E, G> {
    /// Register the calling student, reviving a cancelled registration if one exists
    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn register(
        &self,
        actor: &CurrentUser,
        event_id: Uuid,
        input: RegisterForEvent,
    ) -> EventResult<Registration> {
        if actor.role != Role::Student {
            return Err(EventError::Forbidden(
                "Only students can register for events".to_string(),
            ));
        }

        let event = self.load_visible(Some(actor), event_id).await?;

        if event.status != EventStatus::Published {
            return Err(EventError::Conflict(
                "Event is not open for registration".to_string(),
            ));
        }
        if !event.registration.is_open {
            return Err(EventError::Conflict(
                "Registration is closed for this event".to_string(),
            ));
        }
        let closes_at = event.schedule.as_ref().map(|s| s.registration_closes_at());
        if closes_at.is_none_or(|closes_at| Utc::now() >= closes_at) {
            return Err(EventError::Conflict(
                "Registration deadline has passed".to_string(),
            ));
        }

        let existing = self
            .registrations
            .find_by_event_and_user(event_id, actor.id)
            .await?;
        if existing.as_ref().is_some_and(|r| r.status.is_active()) {
            return Err(EventError::Conflict(
                "You are already registered for this event".to_string(),
            ));
        }

        if let Some(capacity) = event.registration.capacity {
            let active = self.registrations.count_active(event_id).await?;
            if active >= u64::from(capacity) {
                return Err(EventError::Conflict("Event is full".to_string()));
            }
        }

        let participant = self
            .participants
            .participant(actor.id)
            .await?
            .ok_or_else(|| EventError::Forbidden("Account not found or disabled".to_string()))?;

        let missing = participant.missing(&event.registration.required_fields);
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(EventError::Validation(format!(
                "Missing required profile fields: {}",
                names.join(", ")
            )));
        }

        let team = validate_team(&event.registration, &participant, input.team)?;

        let registration = match existing {
            Some(mut registration) => {
                registration.reactivate(&participant, event.registration.kind, team);
                self.registrations.update(registration).await?
            }
            None => {
                let registration =
                    Registration::new(event_id, &participant, event.registration.kind, team);
                self.registrations.create(registration).await?
            }
        };

        info!(event_id = %event_id, registration_id = %registration.id, "Student registered");
        Ok(registration)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn cancel_registration(
        &self,
        actor: &CurrentUser,
        registration_id: Uuid,
    ) -> EventResult<Registration> {
        let mut registration = self.load_registration(registration_id).await?;

        if registration.user_id != actor.id {
            return Err(EventError::Forbidden(
                "You can only cancel your own registration".to_string(),
            ));
        }

        match registration.status {
            RegistrationStatus::Cancelled => {
                return Err(EventError::Conflict(
                    "Registration is already cancelled".to_string(),
                ));
            }
            RegistrationStatus::Attended => {
                return Err(EventError::Conflict(
                    "Attendance has already been recorded".to_string(),
                ));
            }
            RegistrationStatus::Registered => {}
        }

        let event = self.load_event_of(&registration).await?;
        if event.starts_at().is_some_and(|start| Utc::now() >= start) {
            return Err(EventError::Conflict(
                "Registrations cannot be cancelled after the event starts".to_string(),
            ));
        }

        registration.cancel();
        let registration = self.registrations.update(registration).await?;
        info!(registration_id = %registration_id, "Registration cancelled");
        Ok(registration)
    }

    /// The caller's registrations with event details, newest first
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn my_registrations(&self, actor: &CurrentUser) -> EventResult<Vec<MyRegistration>> {
        let registrations = self.registrations.list_by_user(actor.id).await?;

        let mut event_ids: Vec<Uuid> = registrations.iter().map(|r| r.event_id).collect();
        event_ids.sort();
        event_ids.dedup();

        let events = self.events.get_many(event_ids).await?;

        Ok(registrations
            .into_iter()
            .filter_map(|registration| {
                let event = events.iter().find(|e| e.id == registration.event_id)?;
                Some(MyRegistration {
                    event_title: event.title.clone(),
                    event_status: event.status,
                    event_starts_at: event.starts_at(),
                    registration,
                })
            })
            .collect())
    }

    /// Registrations for an event; organizer, assigned coordinators or admin
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn event_registrations(
        &self,
        actor: &CurrentUser,
        event_id: Uuid,
    ) -> EventResult<Vec<Registration>> {
        let event = self.load_visible(Some(actor), event_id).await?;

        if !can_staff(actor, &event) {
            return Err(EventError::Forbidden(
                "Not allowed to view registrations for this event".to_string(),
            ));
        }

        self.registrations.list_by_event(event_id).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn mark_attendance(
        &self,
        actor: &CurrentUser,
        registration_id: Uuid,
        attended: bool,
    ) -> EventResult<Registration> {
        let mut registration = self.load_registration(registration_id).await?;
        let event = self.load_event_of(&registration).await?;

        if !can_staff(actor, &event) {
            return Err(EventError::Forbidden(
                "Not allowed to record attendance for this event".to_string(),
            ));
        }

        if !matches!(event.status, EventStatus::Published | EventStatus::Completed) {
            return Err(EventError::Conflict(
                "Attendance can only be recorded for published or completed events".to_string(),
            ));
        }

        if registration.status == RegistrationStatus::Cancelled {
            return Err(EventError::Conflict(
                "Cancelled registrations cannot be marked".to_string(),
            ));
        }

        registration.set_attended(attended);
        let registration = self.registrations.update(registration).await?;
        info!(registration_id = %registration_id, attended, "Attendance recorded");
        Ok(registration)
    }

    /// Whether the registrant can receive a certificate, and why not
    pub async fn certificate_eligibility(
        &self,
        actor: &CurrentUser,
        registration_id: Uuid,
    ) -> EventResult<CertificateEligibility> {
        let registration = self.load_registration(registration_id).await?;
        let event = self.load_event_of(&registration).await?;

        if registration.user_id != actor.id && !can_staff(actor, &event) {
            return Err(EventError::Forbidden(
                "Not allowed to view this registration".to_string(),
            ));
        }

        let mut reasons = Vec::new();
        if !event.certificate.enabled {
            reasons.push("Certificates are not offered for this event".to_string());
        }
        if event.status != EventStatus::Completed {
            reasons.push("Event has not been completed".to_string());
        }
        match registration.status {
            RegistrationStatus::Cancelled => {
                reasons.push("Registration was cancelled".to_string());
            }
            RegistrationStatus::Registered if event.certificate.requires_attendance => {
                reasons.push("Attendance was not recorded".to_string());
            }
            _ => {}
        }

        Ok(CertificateEligibility {
            registration_id,
            event_id: event.id,
            eligible: reasons.is_empty(),
            reasons,
        })
    }

    async fn load_registration(&self, id: Uuid) -> EventResult<Registration> {
        self.registrations
            .get_by_id(id)
            .await?
            .ok_or(EventError::RegistrationNotFound(id))
    }

    async fn load_event_of(&self, registration: &Registration) -> EventResult<Event> {
        self.events
            .get_by_id(registration.event_id)
            .await?
            .ok_or(EventError::NotFound(registration.event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::models::{CertificateSettings, ProfileField, UpdateEvent};
    use crate::registration::TeamMember;
    use crate::repository::{MockEventRepository, MockRegistrationRepository};
    use chrono::Duration;

    fn team_settings() -> RegistrationSettings {
        RegistrationSettings {
            kind: RegistrationKind::Team,
            min_team_size: 2,
            max_team_size: 3,
            ..Default::default()
        }
    }

    fn member(name: &str, email: &str) -> TeamMember {
        TeamMember {
            name: name.into(),
            email: email.into(),
            roll_number: None,
        }
    }

    fn team(members: Vec<TeamMember>) -> RegisterForEvent {
        RegisterForEvent {
            team: Some(Team {
                name: " Byte Club ".into(),
                members,
            }),
        }
    }

    #[tokio::test]
    async fn test_student_registers_once() {
        let h = harness();
        let event = published_event(&h).await;

        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        assert_eq!(registration.status, RegistrationStatus::Registered);
        assert_eq!(registration.participant_email, h.student.email);

        let again = h
            .service
            .register(&h.student, event.id, Default::default())
            .await;
        assert!(matches!(again, Err(EventError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_students_register() {
        let h = harness();
        let event = published_event(&h).await;

        for actor in [&h.organizer, &h.coordinator, &h.admin] {
            let result = h.service.register(actor, event.id, Default::default()).await;
            assert!(matches!(result, Err(EventError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn test_draft_event_is_not_found_for_students() {
        let h = harness();
        let draft = h
            .service
            .create_event(&h.organizer, complete_input())
            .await
            .unwrap();

        let result = h.service.register(&h.student, draft.id, Default::default()).await;
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_closed_registration_rejected() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.registration = Some(RegistrationSettings {
                is_open: false,
                ..Default::default()
            });
        })
        .await;

        let result = h.service.register(&h.student, event.id, Default::default()).await;
        assert!(matches!(result, Err(EventError::Conflict(msg)) if msg.contains("closed")));
    }

    #[tokio::test]
    async fn test_deadline_passed_rejected() {
        let h = harness();
        let event = published_event(&h).await;
        start_event(&h, event.id).await;

        let result = h.service.register(&h.student, event.id, Default::default()).await;
        assert!(matches!(result, Err(EventError::Conflict(msg)) if msg.contains("deadline")));
    }

    #[tokio::test]
    async fn test_full_event_rejected() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.registration = Some(RegistrationSettings {
                capacity: Some(1),
                ..Default::default()
            });
        })
        .await;

        h.service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        let result = h
            .service
            .register(&h.second_student, event.id, Default::default())
            .await;
        assert!(matches!(result, Err(EventError::Conflict(msg)) if msg == "Event is full"));
    }

    #[tokio::test]
    async fn test_missing_profile_fields_listed() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.registration = Some(RegistrationSettings {
                required_fields: vec![ProfileField::Phone, ProfileField::RollNumber],
                ..Default::default()
            });
        })
        .await;

        let result = h
            .service
            .register(&h.incomplete_student, event.id, Default::default())
            .await;
        match result {
            Err(EventError::Validation(msg)) => {
                assert_eq!(msg, "Missing required profile fields: phone, roll_number");
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        h.service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_registration_is_reactivated() {
        let h = harness();
        let event = published_event(&h).await;

        let first = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        h.service
            .cancel_registration(&h.student, first.id)
            .await
            .unwrap();

        let second = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, RegistrationStatus::Registered);
    }

    #[tokio::test]
    async fn test_reactivated_registration_follows_new_event_kind() {
        let h = harness();
        let event = published_event(&h).await;

        let first = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        assert_eq!(first.kind, RegistrationKind::Individual);
        h.service
            .cancel_registration(&h.student, first.id)
            .await
            .unwrap();

        h.service
            .update_event(
                &h.organizer,
                event.id,
                UpdateEvent {
                    registration: Some(RegistrationSettings {
                        kind: RegistrationKind::Team,
                        min_team_size: 1,
                        max_team_size: 3,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let second = h
            .service
            .register(&h.student, event.id, team(vec![member("B", "b@campus.edu")]))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.kind, RegistrationKind::Team);
        assert_eq!(second.team.as_ref().unwrap().members.len(), 1);

        let stored = h.registrations.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.kind, RegistrationKind::Team);
    }

    #[tokio::test]
    async fn test_team_takes_one_seat_and_cancellation_frees_it() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.registration = Some(RegistrationSettings {
                capacity: Some(1),
                ..team_settings()
            });
        })
        .await;

        let three_people = team(vec![
            member("B", "b@campus.edu"),
            member("C", "c@campus.edu"),
        ]);
        let taken = h
            .service
            .register(&h.student, event.id, three_people)
            .await
            .unwrap();

        let summary = h.service.event_summary(None, event.id).await.unwrap();
        assert_eq!(summary.registered, 1);
        assert_eq!(summary.seats_left, Some(0));

        let other_team = team(vec![member("D", "d@campus.edu")]);
        let result = h
            .service
            .register(&h.second_student, event.id, other_team.clone())
            .await;
        assert!(matches!(result, Err(EventError::Conflict(msg)) if msg == "Event is full"));

        h.service
            .cancel_registration(&h.student, taken.id)
            .await
            .unwrap();

        let registration = h
            .service
            .register(&h.second_student, event.id, other_team)
            .await
            .unwrap();
        assert_eq!(registration.status, RegistrationStatus::Registered);
    }

    #[tokio::test]
    async fn test_team_registration_rules() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.registration = Some(team_settings());
        })
        .await;

        let result = h.service.register(&h.student, event.id, Default::default()).await;
        assert!(matches!(result, Err(EventError::Validation(_))));

        let too_big = team(vec![
            member("B", "b@campus.edu"),
            member("C", "c@campus.edu"),
            member("D", "d@campus.edu"),
        ]);
        let result = h.service.register(&h.student, event.id, too_big).await;
        assert!(matches!(result, Err(EventError::Validation(_))));

        let duplicate = team(vec![member("Me again", "ADA@campus.edu")]);
        let result = h.service.register(&h.student, event.id, duplicate).await;
        assert!(matches!(result, Err(EventError::Validation(msg)) if msg.contains("unique")));

        let registration = h
            .service
            .register(&h.student, event.id, team(vec![member("Bob", " Bob@Campus.edu ")]))
            .await
            .unwrap();
        let team = registration.team.unwrap();
        assert_eq!(team.name, "Byte Club");
        assert_eq!(team.members[0].email, "bob@campus.edu");
        assert_eq!(registration.kind, RegistrationKind::Team);
    }

    #[test]
    fn test_individual_event_rejects_team_payload() {
        let participant = Participant::default();
        let result = validate_team(
            &RegistrationSettings::default(),
            &participant,
            team(vec![]).team,
        );
        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[test]
    fn test_blank_team_name_rejected() {
        let participant = Participant::default();
        let result = validate_team(
            &team_settings(),
            &participant,
            Some(Team {
                name: "  ".into(),
                members: vec![member("B", "b@campus.edu")],
            }),
        );
        assert!(matches!(result, Err(EventError::Validation(msg)) if msg == "Team name is required"));
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let h = harness();
        let event = published_event(&h).await;
        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();

        let result = h
            .service
            .cancel_registration(&h.second_student, registration.id)
            .await;
        assert!(matches!(result, Err(EventError::Forbidden(_))));

        start_event(&h, event.id).await;
        let result = h
            .service
            .cancel_registration(&h.student, registration.id)
            .await;
        assert!(matches!(result, Err(EventError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_after_attendance_rejected() {
        let h = harness();
        let event = published_event(&h).await;
        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        h.service
            .mark_attendance(&h.organizer, registration.id, true)
            .await
            .unwrap();

        let result = h
            .service
            .cancel_registration(&h.student, registration.id)
            .await;
        assert!(matches!(result, Err(EventError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_my_registrations_include_event_details() {
        let h = harness();
        let first = published_event(&h).await;
        let second = published_event(&h).await;
        h.service
            .register(&h.student, first.id, Default::default())
            .await
            .unwrap();
        h.service
            .register(&h.student, second.id, Default::default())
            .await
            .unwrap();

        let mine = h.service.my_registrations(&h.student).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].registration.event_id, second.id);
        assert_eq!(mine[0].event_title, "HackNight");
        assert_eq!(mine[0].event_status, EventStatus::Published);

        assert!(h.service.my_registrations(&h.second_student).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registration_list_access() {
        let h = harness();
        let event = published_event(&h).await;
        h.service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();

        assert_eq!(
            h.service
                .event_registrations(&h.organizer, event.id)
                .await
                .unwrap()
                .len(),
            1
        );

        for actor in [&h.student, &h.coordinator, &h.other_organizer] {
            let result = h.service.event_registrations(actor, event.id).await;
            assert!(matches!(result, Err(EventError::Forbidden(_))));
        }

        h.service
            .assign_coordinators(&h.organizer, event.id, vec![h.coordinator.id])
            .await
            .unwrap();
        assert!(h.service.event_registrations(&h.coordinator, event.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_assigned_coordinator_marks_attendance() {
        let h = harness();
        let event = published_event(&h).await;
        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();

        let result = h
            .service
            .mark_attendance(&h.coordinator, registration.id, true)
            .await;
        assert!(matches!(result, Err(EventError::Forbidden(_))));

        h.service
            .assign_coordinators(&h.organizer, event.id, vec![h.coordinator.id])
            .await
            .unwrap();
        let marked = h
            .service
            .mark_attendance(&h.coordinator, registration.id, true)
            .await
            .unwrap();
        assert_eq!(marked.status, RegistrationStatus::Attended);
        assert!(marked.attended_at.is_some());

        let summary = h.service.event_summary(None, event.id).await.unwrap();
        assert_eq!(summary.attended, 1);
    }

    #[tokio::test]
    async fn test_attendance_rejected_for_cancelled_event_or_registration() {
        let h = harness();
        let event = published_event(&h).await;
        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();
        h.service
            .cancel_registration(&h.student, registration.id)
            .await
            .unwrap();

        let result = h
            .service
            .mark_attendance(&h.organizer, registration.id, true)
            .await;
        assert!(matches!(result, Err(EventError::Conflict(_))));

        h.service.cancel_event(&h.organizer, event.id).await.unwrap();
        let result = h
            .service
            .mark_attendance(&h.organizer, registration.id, true)
            .await;
        assert!(matches!(result, Err(EventError::Conflict(msg)) if msg.contains("published")));
    }

    #[tokio::test]
    async fn test_certificate_eligibility() {
        let h = harness();
        let event = published_event_with(&h, |input| {
            input.certificate = Some(CertificateSettings {
                enabled: true,
                requires_attendance: true,
            });
        })
        .await;
        let registration = h
            .service
            .register(&h.student, event.id, Default::default())
            .await
            .unwrap();

        let before = h
            .service
            .certificate_eligibility(&h.student, registration.id)
            .await
            .unwrap();
        assert!(!before.eligible);
        assert_eq!(before.reasons.len(), 2);

        h.service
            .mark_attendance(&h.organizer, registration.id, true)
            .await
            .unwrap();
        start_event(&h, event.id).await;
        h.service.complete_event(&h.organizer, event.id).await.unwrap();

        let after = h
            .service
            .certificate_eligibility(&h.student, registration.id)
            .await
            .unwrap();
        assert!(after.eligible, "{:?}", after.reasons);

        let result = h
            .service
            .certificate_eligibility(&h.second_student, registration.id)
            .await;
        assert!(matches!(result, Err(EventError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_unknown_registration_is_not_found() {
        let h = harness();
        let result = h
            .service
            .cancel_registration(&h.student, Uuid::now_v7())
            .await;
        assert!(matches!(result, Err(EventError::RegistrationNotFound(_))));
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_register() {
        let h = harness();
        let event = published_event(&h).await;

        let mut events = MockEventRepository::new();
        let stored = event.clone();
        events
            .expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let mut registrations = MockRegistrationRepository::new();
        registrations
            .expect_find_by_event_and_user()
            .returning(|_, _| Ok(None));
        registrations.expect_create().never();

        let service = EventService::new(events, registrations, directory(vec![]));
        let result = service
            .register(&h.student, event.id, Default::default())
            .await;
        assert!(matches!(result, Err(EventError::Forbidden(msg)) if msg.contains("disabled")));
    }

    #[tokio::test]
    async fn test_deadline_is_checked_against_explicit_deadline() {
        let h = harness();
        let event = published_event(&h).await;

        let mut stored = h.events.get_by_id(event.id).await.unwrap().unwrap();
        if let Some(schedule) = stored.schedule.as_mut() {
            schedule.registration_deadline = Some(Utc::now() - Duration::minutes(1));
        }
        h.events.update(stored).await.unwrap();

        let result = h.service.register(&h.student, event.id, Default::default()).await;
        assert!(matches!(result, Err(EventError::Conflict(_))));
    }
}

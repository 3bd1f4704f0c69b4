//! Event service layer: lifecycle, visibility and registrations

use axum_helpers::{CurrentUser, Role};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{
    CreateEvent, DraftScope, Event, EventFilter, EventList, EventQuery, EventStats, EventStatus,
    EventSummary, UpdateEvent,
};
use crate::participants::ParticipantDirectory;
use crate::repository::{EventRepository, RegistrationRepository};

#[cfg(test)]
pub(crate) mod fixtures;
mod registrations;

const MAX_PAGE_SIZE: i64 = 100;

/// Events and their registrations.
///
/// Every operation takes the caller and enforces the role rules itself.
pub struct EventService<E: EventRepository, G: RegistrationRepository> {
    events: Arc<E>,
    registrations: Arc<G>,
    participants: Arc<dyn ParticipantDirectory>,
}

impl<E: EventRepository, G: RegistrationRepository> Clone for EventService<E, G> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            registrations: Arc::clone(&self.registrations),
            participants: Arc::clone(&self.participants),
        }
    }
}

/// Non-draft events are public; drafts are visible to the admin, their
/// organizer and their assigned coordinators
pub fn can_view(viewer: Option<&CurrentUser>, event: &Event) -> bool {
    if event.status != EventStatus::Draft {
        return true;
    }
    match viewer {
        None => false,
        Some(user) => match user.role {
            Role::MainAdmin => true,
            Role::Organizer => event.created_by == user.id,
            Role::StudentCoordinator => event.is_coordinator(user.id),
            Role::Student => false,
        },
    }
}

/// Admin, or the organizer who owns the event
pub fn can_manage(actor: &CurrentUser, event: &Event) -> bool {
    actor.is_admin() || (actor.role == Role::Organizer && event.created_by == actor.id)
}

/// May see registrations and mark attendance
pub fn can_staff(actor: &CurrentUser, event: &Event) -> bool {
    can_manage(actor, event)
        || (actor.role == Role::StudentCoordinator && event.is_coordinator(actor.id))
}

/// Published, open, before the deadline and not full
pub fn is_registration_open(event: &Event, active: u64, now: DateTime<Utc>) -> bool {
    event.status == EventStatus::Published
        && event.registration.is_open
        && event
            .schedule
            .as_ref()
            .is_some_and(|s| now < s.registration_closes_at())
        && event
            .registration
            .capacity
            .is_none_or(|capacity| active < u64::from(capacity))
}

fn draft_scope(viewer: Option<&CurrentUser>) -> DraftScope {
    match viewer {
        None => DraftScope::None,
        Some(user) => match user.role {
            Role::MainAdmin => DraftScope::All,
            Role::Organizer => DraftScope::OwnedBy(user.id),
            Role::StudentCoordinator => DraftScope::CoordinatedBy(user.id),
            Role::Student => DraftScope::None,
        },
    }
}

/// Resolve a request filter against the viewer
pub fn build_query(viewer: Option<&CurrentUser>, filter: EventFilter) -> EventResult<EventQuery> {
    let mine = filter.mine.unwrap_or(false);
    let assigned = filter.assigned.unwrap_or(false);

    if (mine || assigned) && viewer.is_none() {
        return Err(EventError::Unauthorized(
            "Authentication required".to_string(),
        ));
    }

    let viewer_id = viewer.map(|v| v.id);

    Ok(EventQuery {
        drafts: draft_scope(viewer),
        status: filter.status,
        category: filter.category,
        search: filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        starts_after: filter.upcoming.unwrap_or(false).then(Utc::now),
        created_by: if mine { viewer_id } else { None },
        coordinator: if assigned { viewer_id } else { None },
        limit: filter.limit.clamp(1, MAX_PAGE_SIZE),
        offset: filter.offset,
    })
}

impl<E: EventRepository, G: RegistrationRepository> EventService<E, G> {
    pub fn new(events: E, registrations: G, participants: Arc<dyn ParticipantDirectory>) -> Self {
        Self {
            events: Arc::new(events),
            registrations: Arc::new(registrations),
            participants,
        }
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn create_event(&self, actor: &CurrentUser, input: CreateEvent) -> EventResult<Event> {
        actor.require_any(&[Role::Organizer, Role::MainAdmin])?;

        let event = self.events.create(Event::new(input, actor.id)).await?;
        info!(event_id = %event.id, "Draft event created");
        Ok(event)
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn update_event(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        input: UpdateEvent,
    ) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status.is_final() {
            return Err(EventError::Conflict(format!(
                "A {} event cannot be edited",
                event.status
            )));
        }

        if let Some(settings) = &input.registration {
            let active = self.registrations.count_active(id).await?;
            if active > 0 {
                if settings.kind != event.registration.kind {
                    return Err(EventError::Conflict(
                        "Registration type cannot change once students have registered"
                            .to_string(),
                    ));
                }
                if settings
                    .capacity
                    .is_some_and(|capacity| u64::from(capacity) < active)
                {
                    return Err(EventError::Conflict(format!(
                        "Capacity cannot be lower than the {} existing registrations",
                        active
                    )));
                }
            }
        }

        event.apply_update(input);

        if event.status == EventStatus::Published {
            let problems = event.publish_problems();
            if !problems.is_empty() {
                return Err(EventError::Incomplete(problems));
            }
        }

        let event = self.events.update(event).await?;
        info!(event_id = %id, "Event updated");
        Ok(event)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn publish_event(&self, actor: &CurrentUser, id: Uuid) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status != EventStatus::Draft {
            return Err(EventError::Conflict(format!(
                "Only draft events can be published (status: {})",
                event.status
            )));
        }

        let problems = event.publish_problems();
        if !problems.is_empty() {
            return Err(EventError::Incomplete(problems));
        }

        let now = Utc::now();
        event.status = EventStatus::Published;
        event.published_at = Some(now);
        event.updated_at = now;

        let event = self.events.update(event).await?;
        info!(event_id = %id, "Event published");
        Ok(event)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn unpublish_event(&self, actor: &CurrentUser, id: Uuid) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status != EventStatus::Published {
            return Err(EventError::Conflict(
                "Only published events can be unpublished".to_string(),
            ));
        }

        if self.registrations.count_active(id).await? > 0 {
            return Err(EventError::Conflict(
                "Event has active registrations and cannot be unpublished".to_string(),
            ));
        }

        event.status = EventStatus::Draft;
        event.published_at = None;
        event.updated_at = Utc::now();

        let event = self.events.update(event).await?;
        info!(event_id = %id, "Event moved back to draft");
        Ok(event)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn cancel_event(&self, actor: &CurrentUser, id: Uuid) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status.is_final() {
            return Err(EventError::Conflict(format!(
                "A {} event cannot be cancelled",
                event.status
            )));
        }

        event.status = EventStatus::Cancelled;
        event.updated_at = Utc::now();

        let event = self.events.update(event).await?;
        info!(event_id = %id, "Event cancelled");
        Ok(event)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn complete_event(&self, actor: &CurrentUser, id: Uuid) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status != EventStatus::Published {
            return Err(EventError::Conflict(
                "Only published events can be completed".to_string(),
            ));
        }

        let now = Utc::now();
        if event.starts_at().is_none_or(|start| now < start) {
            return Err(EventError::Validation(
                "Event cannot be completed before it starts".to_string(),
            ));
        }

        event.status = EventStatus::Completed;
        event.updated_at = now;

        let event = self.events.update(event).await?;
        info!(event_id = %id, "Event completed");
        Ok(event)
    }

    /// Admins delete anything; organizers only their own drafts.
    /// Registrations go with the event.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_event(&self, actor: &CurrentUser, id: Uuid) -> EventResult<()> {
        let event = self.load_visible(Some(actor), id).await?;

        if !actor.is_admin() {
            if !can_manage(actor, &event) {
                return Err(EventError::Forbidden(
                    "Only the event's organizer or an admin can delete it".to_string(),
                ));
            }
            if event.status != EventStatus::Draft {
                return Err(EventError::Conflict(
                    "Organizers can only delete draft events".to_string(),
                ));
            }
        }

        if !self.events.delete(id).await? {
            return Err(EventError::NotFound(id));
        }
        let removed = self.registrations.delete_by_event(id).await?;

        info!(event_id = %id, registrations = removed, "Event deleted");
        Ok(())
    }

    /// Replace the coordinator list; every id must be a student coordinator
    #[instrument(skip(self, actor, coordinators), fields(actor_id = %actor.id))]
    pub async fn assign_coordinators(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        coordinators: Vec<Uuid>,
    ) -> EventResult<Event> {
        let mut event = self.load_managed(actor, id).await?;

        if event.status.is_final() {
            return Err(EventError::Conflict(format!(
                "A {} event cannot be edited",
                event.status
            )));
        }

        let mut unique = Vec::with_capacity(coordinators.len());
        for user_id in coordinators {
            if unique.contains(&user_id) {
                continue;
            }
            match self.participants.participant(user_id).await? {
                Some(p) if p.role == Role::StudentCoordinator => unique.push(user_id),
                Some(_) => {
                    return Err(EventError::Validation(format!(
                        "User {} is not a student coordinator",
                        user_id
                    )));
                }
                None => {
                    return Err(EventError::Validation(format!(
                        "User {} not found",
                        user_id
                    )));
                }
            }
        }

        event.coordinators = unique;
        event.updated_at = Utc::now();

        let event = self.events.update(event).await?;
        info!(event_id = %id, count = event.coordinators.len(), "Coordinators assigned");
        Ok(event)
    }

    pub async fn get_event(&self, viewer: Option<&CurrentUser>, id: Uuid) -> EventResult<Event> {
        self.load_visible(viewer, id).await
    }

    #[instrument(skip(self, viewer))]
    pub async fn list_events(
        &self,
        viewer: Option<&CurrentUser>,
        filter: EventFilter,
    ) -> EventResult<EventList> {
        let query = build_query(viewer, filter)?;
        let total = self.events.count(&query).await?;
        let items = self.events.list(&query).await?;
        Ok(EventList { items, total })
    }

    pub async fn event_summary(
        &self,
        viewer: Option<&CurrentUser>,
        id: Uuid,
    ) -> EventResult<EventSummary> {
        let event = self.load_visible(viewer, id).await?;
        let registered = self.registrations.count_active(id).await?;
        let attended = self.registrations.count_attended(id).await?;
        let capacity = event.registration.capacity;

        Ok(EventSummary {
            event_id: id,
            status: event.status,
            registered,
            attended,
            capacity,
            seats_left: capacity.map(|c| u64::from(c).saturating_sub(registered)),
            is_registration_open: is_registration_open(&event, registered, Utc::now()),
        })
    }

    pub async fn stats(&self) -> EventResult<EventStats> {
        self.events.count_by_status().await
    }

    /// Missing and invisible events both read as not found
    async fn load_visible(&self, viewer: Option<&CurrentUser>, id: Uuid) -> EventResult<Event> {
        match self.events.get_by_id(id).await? {
            Some(event) if can_view(viewer, &event) => Ok(event),
            _ => Err(EventError::NotFound(id)),
        }
    }

    async fn load_managed(&self, actor: &CurrentUser, id: Uuid) -> EventResult<Event> {
        let event = self.load_visible(Some(actor), id).await?;
        if !can_manage(actor, &event) {
            return Err(EventError::Forbidden(
                "Only the event's organizer or an admin can manage it".to_string(),
            ));
        }
        Ok(event)
    }
}

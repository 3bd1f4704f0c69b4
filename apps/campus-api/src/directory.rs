//! Bridges user accounts into the events domain as registrants and into
//! the auth middleware as live account state

use async_trait::async_trait;
use axum_helpers::{AccountStatus, AppError, Role};
use domain_events::{EventError, EventResult, Participant, ParticipantDirectory};
use domain_users::{ParticipantProfile, UserError, UserRepository, UserService};
use uuid::Uuid;

pub struct UserDirectory<R: UserRepository> {
    users: UserService<R>,
}

impl<R: UserRepository> UserDirectory<R> {
    pub fn new(users: UserService<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> ParticipantDirectory for UserDirectory<R> {
    async fn participant(&self, user_id: Uuid) -> EventResult<Option<Participant>> {
        let profile = self
            .users
            .participant_profile(user_id)
            .await
            .map_err(|e| match e {
                UserError::Database(msg) => EventError::Database(msg),
                other => EventError::Internal(other.to_string()),
            })?;

        Ok(profile.map(into_participant))
    }
}

#[async_trait]
impl<R: UserRepository + 'static> AccountStatus for UserDirectory<R> {
    async fn active_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError> {
        let profile = self.users.participant_profile(user_id).await?;
        Ok(profile.map(|p| p.role))
    }
}

fn into_participant(profile: ParticipantProfile) -> Participant {
    let ParticipantProfile {
        id,
        name,
        email,
        role,
        profile,
    } = profile;

    Participant {
        id,
        name,
        email,
        role,
        phone: profile.phone,
        department: profile.department,
        year_of_study: profile.year_of_study,
        roll_number: profile.roll_number,
        college: profile.college,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use axum_helpers::{JwtAuth, JwtConfig};
    use domain_events::{
        EventService, InMemoryEventRepository, InMemoryRegistrationRepository, handlers,
    };
    use domain_users::{InMemoryUserRepository, StudentProfile, User};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn student() -> User {
        let mut user = User::new(
            "maya@campus.edu".into(),
            "Maya".into(),
            "not-a-real-hash".into(),
            Role::Student,
        );
        user.profile = StudentProfile {
            phone: Some("9876543210".into()),
            department: Some("Physics".into()),
            year_of_study: Some(2),
            roll_number: Some("PH-042".into()),
            college: None,
        };
        user
    }

    #[tokio::test]
    async fn test_participant_carries_profile() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(student()).await.unwrap();
        let directory = UserDirectory::new(UserService::new(repo));

        let participant = directory.participant(user.id).await.unwrap().unwrap();
        assert_eq!(participant.email, "maya@campus.edu");
        assert_eq!(participant.role, Role::Student);
        assert_eq!(participant.department.as_deref(), Some("Physics"));
        assert_eq!(participant.year_of_study, Some(2));
        assert!(participant.college.is_none());
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_accounts_are_absent() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(student()).await.unwrap();
        user.is_active = false;
        repo.update(user.clone()).await.unwrap();
        let directory = UserDirectory::new(UserService::new(repo));

        assert!(directory.participant(user.id).await.unwrap().is_none());
        assert!(directory.participant(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_status_reports_current_role() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(student()).await.unwrap();
        user.role = Role::Organizer;
        repo.update(user.clone()).await.unwrap();
        let directory = UserDirectory::new(UserService::new(repo.clone()));

        assert_eq!(
            directory.active_role(user.id).await.unwrap(),
            Some(Role::Organizer)
        );

        user.is_active = false;
        repo.update(user.clone()).await.unwrap();
        assert_eq!(directory.active_role(user.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deactivated_organizer_loses_access_before_token_expiry() {
        let repo = InMemoryUserRepository::new();
        let mut organizer = repo
            .create(User::new(
                "org@campus.edu".into(),
                "Org".into(),
                "hash".into(),
                Role::Organizer,
            ))
            .await
            .unwrap();
        let users = UserService::new(repo.clone());

        let jwt = JwtAuth::new(&JwtConfig::new("directory-test-secret-long-enough-for-hs256"));
        let token = jwt
            .create_access_token(organizer.id, &organizer.email, &organizer.name, organizer.role)
            .unwrap();
        let jwt = jwt.with_account_status(Arc::new(UserDirectory::new(users.clone())));

        let events = EventService::new(
            InMemoryEventRepository::new(),
            InMemoryRegistrationRepository::new(),
            Arc::new(UserDirectory::new(users)),
        );
        let app = handlers::router(events, jwt);

        let create = || {
            Request::builder()
                .method("POST")
                .uri("/")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "title": "Chess Night" }).to_string()))
                .unwrap()
        };

        let response = app.clone().oneshot(create()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        organizer.is_active = false;
        repo.update(organizer).await.unwrap();

        let response = app.oneshot(create()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

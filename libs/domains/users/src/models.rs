use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub use axum_helpers::Role;

/// Optional student details, checked against an event's required fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct StudentProfile {
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    #[validate(range(min = 1, max = 6))]
    pub year_of_study: Option<u8>,
    #[validate(length(min = 1, max = 50))]
    pub roll_number: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub college: Option<String>,
}

impl StudentProfile {
    /// Trim text fields and drop the blank ones
    pub fn normalized(self) -> Self {
        Self {
            phone: non_blank(self.phone),
            department: non_blank(self.department),
            year_of_study: self.year_of_study,
            roll_number: non_blank(self.roll_number),
            college: non_blank(self.college),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Stored account document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Lowercased, unique
    pub email: String,
    pub name: String,
    /// Argon2 PHC string; never leaves the service
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub profile: StudentProfile,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email,
            name,
            password_hash,
            role,
            profile: StudentProfile::default(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, input: UpdateProfile) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }

        let profile = &mut self.profile;
        if let Some(phone) = input.phone {
            profile.phone = non_blank(Some(phone));
        }
        if let Some(department) = input.department {
            profile.department = non_blank(Some(department));
        }
        if let Some(year) = input.year_of_study {
            profile.year_of_study = Some(year);
        }
        if let Some(roll_number) = input.roll_number {
            profile.roll_number = non_blank(Some(roll_number));
        }
        if let Some(college) = input.college {
            profile.college = non_blank(Some(college));
        }

        self.updated_at = Utc::now();
    }
}

/// Account as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub profile: StudentProfile,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            profile: user.profile,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Self-service student sign-up
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub profile: Option<StudentProfile>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Returned by register and login; the token is also set as a cookie
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

/// Partial profile update. Blank text clears the field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(range(min = 1, max = 6))]
    pub year_of_study: Option<u8>,
    #[validate(length(max = 50))]
    pub roll_number: Option<String>,
    #[validate(length(max = 150))]
    pub college: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    pub new_password: String,
}

/// Account created by the main admin
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    #[validate(nested)]
    pub profile: Option<StudentProfile>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetStatusRequest {
    pub is_active: bool,
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    pub role: Option<Role>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

/// Page of users with the unpaginated total
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub items: Vec<UserResponse>,
    pub total: u64,
}

/// What the events domain needs to know about a registrant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile: StudentProfile,
}

impl From<User> for ParticipantProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            profile: user.profile,
        }
    }
}

/// Accounts per role, for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleCounts {
    pub main_admin: u64,
    pub organizer: u64,
    pub student_coordinator: u64,
    pub student: u64,
}

impl RoleCounts {
    pub fn set(&mut self, role: Role, count: u64) {
        match role {
            Role::MainAdmin => self.main_admin = count,
            Role::Organizer => self.organizer = count,
            Role::StudentCoordinator => self.student_coordinator = count,
            Role::Student => self.student = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.main_admin + self.organizer + self.student_coordinator + self.student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_profile_drops_blank_fields() {
        let profile = StudentProfile {
            phone: Some("  ".into()),
            department: Some(" CSE ".into()),
            year_of_study: Some(2),
            roll_number: None,
            college: Some(String::new()),
        }
        .normalized();

        assert_eq!(profile.phone, None);
        assert_eq!(profile.department.as_deref(), Some("CSE"));
        assert_eq!(profile.college, None);
    }

    #[test]
    fn test_apply_update_clears_blank_and_keeps_missing() {
        let mut user = User::new("a@campus.edu".into(), "Ada".into(), "hash".into(), Role::Student);
        user.profile.phone = Some("5551234567".into());
        user.profile.college = Some("North".into());

        user.apply_update(UpdateProfile {
            name: Some(" Ada L ".into()),
            phone: Some("".into()),
            ..Default::default()
        });

        assert_eq!(user.name, "Ada L");
        assert_eq!(user.profile.phone, None);
        assert_eq!(user.profile.college.as_deref(), Some("North"));
    }

    #[test]
    fn test_profile_year_range() {
        let profile = StudentProfile {
            year_of_study: Some(7),
            ..Default::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_user_document_uses_underscore_id() {
        let user = User::new("a@campus.edu".into(), "Ada".into(), "hash".into(), Role::Organizer);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("_id").is_some());
        assert_eq!(json["role"], "ORGANIZER");
    }

    #[test]
    fn test_role_counts_total() {
        let mut counts = RoleCounts::default();
        counts.set(Role::Student, 10);
        counts.set(Role::Organizer, 2);
        assert_eq!(counts.total(), 12);
    }
}

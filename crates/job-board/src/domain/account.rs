use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;

/// The two account roles driving route access and available actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    JobSeeker,
    Employer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::JobSeeker => "JOB_SEEKER",
            Role::Employer => "EMPLOYER",
        }
    }

    /// Accepts the wire literal with surrounding whitespace and any casing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "JOB_SEEKER" => Some(Role::JobSeeker),
            "EMPLOYER" => Some(Role::Employer),
            _ => None,
        }
    }

    /// Where a freshly authenticated account lands.
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Role::JobSeeker => "/jobseeker/dashboard",
            Role::Employer => "/employer/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub user_role: Role,
}

/// Opaque bearer token issued by `/api/auth/login` and `/api/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

/// Body of `POST /api/users/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl ProfileUpdate {
    /// Form pre-filled from the stored profile, blanks for missing fields.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone().unwrap_or_default(),
            last_name: profile.last_name.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
        }
    }
}

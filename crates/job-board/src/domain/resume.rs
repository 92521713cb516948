use serde::{Deserialize, Serialize};

use super::{ResumeId, UserId};

/// A job seeker's profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: ResumeId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    pub user_id: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: i64,
    pub resume_id: ResumeId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEducation {
    pub resume_id: ResumeId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
}

impl NewEducation {
    /// Entries are only stored when institution, degree and field are all filled in.
    pub fn is_complete(&self) -> bool {
        !self.institution.trim().is_empty()
            && !self.degree.trim().is_empty()
            && !self.field_of_study.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub resume_id: ResumeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub resume_id: ResumeId,
    pub name: String,
}

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{ApplicationId, ResumeId, UserId, VacancyId};
use crate::workflows::applications::RecordedStatus;

/// A candidate's submission of a resume against a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub vacancy_id: VacancyId,
    pub candidate_id: UserId,
    pub resume_id: ResumeId,
    #[serde(default)]
    pub employer_id: Option<UserId>,
    #[serde(rename = "statusName", alias = "status")]
    pub status: RecordedStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Body the backend expects for reject/withdraw, keyed by the original parties.
    pub fn to_request(&self, employer_id: UserId) -> ApplicationRequest {
        ApplicationRequest {
            vacancy_id: self.vacancy_id,
            employer_id: self.employer_id.unwrap_or(employer_id),
            candidate_id: self.candidate_id,
            resume_id: self.resume_id,
        }
    }
}

/// Payload of `POST /api/applications`, `/reject` and `/withdrawn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub vacancy_id: VacancyId,
    pub employer_id: UserId,
    pub candidate_id: UserId,
    pub resume_id: ResumeId,
}

/// Aggregated counts reported by the statistics endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatistics {
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub applications_by_status: BTreeMap<String, u64>,
}

/// Accepts RFC 3339 timestamps and the zone-less `LocalDateTime` form, read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("failed to parse '{raw}' as a timestamp ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applications::ApplicationStatus;
    use chrono::TimeZone;

    #[test]
    fn decodes_application_with_local_timestamp() {
        let application: Application = serde_json::from_str(
            r#"{"id":11,"vacancyId":4,"candidateId":7,"resumeId":2,"employerId":3,
                "statusName":" NEW ","createdAt":"2025-03-01T09:30:00"}"#,
        )
        .expect("decodes");

        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(
            application.created_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn unrecognized_status_does_not_fail_the_list() {
        let applications: Vec<Application> = serde_json::from_str(
            r#"[{"id":1,"vacancyId":4,"candidateId":7,"resumeId":2,
                 "statusName":"PENDING","createdAt":"2025-03-01T09:30:00Z"},
                {"id":2,"vacancyId":4,"candidateId":8,"resumeId":3,
                 "statusName":"IN_REVIEW","createdAt":"2025-03-01T09:30:00Z"}]"#,
        )
        .expect("decodes");

        assert_eq!(applications[0].status, ApplicationStatus::Pending);
        assert_eq!(
            applications[1].status,
            RecordedStatus::Unrecognized("IN_REVIEW".to_string())
        );
    }

    #[test]
    fn accepts_offset_timestamps() {
        let parsed = parse_timestamp("2025-03-01T12:30:00+03:00").expect("parses");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn request_prefers_recorded_employer() {
        let application: Application = serde_json::from_str(
            r#"{"id":1,"vacancyId":4,"candidateId":7,"resumeId":2,"employerId":3,
                "statusName":"PENDING","createdAt":"2025-03-01T09:30:00Z"}"#,
        )
        .expect("decodes");

        let request = application.to_request(UserId(99));
        assert_eq!(request.employer_id, UserId(3));
        assert_eq!(request.candidate_id, UserId(7));
    }
}

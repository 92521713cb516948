use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::api::ApiError;
use crate::domain::{
    Application, ApplicationId, ApplicationRequest, ApplicationStatistics, Resume, ResumeId, Role,
    UserId, Vacancy, VacancyId,
};
use crate::session::Identity;
use crate::workflows::applications::{ApplicationGateway, ApplicationStatus, ApplicationWorkflow};

pub(super) const EMPLOYER: UserId = UserId(10);
pub(super) const OTHER_EMPLOYER: UserId = UserId(11);
pub(super) const CANDIDATE: UserId = UserId(20);
pub(super) const OTHER_CANDIDATE: UserId = UserId(21);

pub(super) fn employer() -> Identity {
    Identity {
        user_id: EMPLOYER,
        role: Role::Employer,
    }
}

pub(super) fn candidate() -> Identity {
    Identity {
        user_id: CANDIDATE,
        role: Role::JobSeeker,
    }
}

pub(super) fn application(
    id: i64,
    candidate_id: UserId,
    employer_id: Option<UserId>,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: ApplicationId(id),
        vacancy_id: VacancyId(1),
        candidate_id,
        resume_id: ResumeId(100 + id),
        employer_id,
        status: status.into(),
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn vacancy(published: bool) -> Vacancy {
    Vacancy {
        id: VacancyId(1),
        title: "Rust Engineer".to_string(),
        description: "Async services".to_string(),
        salary: Some(250_000.0),
        company_id: None,
        company_name: Some("Ferris Labs".to_string()),
        employer_id: EMPLOYER,
        is_published: published,
    }
}

pub(super) fn resume(owner: UserId) -> Resume {
    Resume {
        id: ResumeId(5),
        user_id: owner,
        title: "Backend developer".to_string(),
        summary: None,
        experience_years: Some(4),
        contact_email: None,
        contact_phone: None,
        is_published: true,
    }
}

pub(super) fn workflow_with(
    applications: Vec<Application>,
) -> (ApplicationWorkflow<MemoryGateway>, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::with_applications(applications));
    (ApplicationWorkflow::new(gateway.clone()), gateway)
}

/// Backend stand-in honouring the same transition rules as the real service.
#[derive(Default)]
pub(super) struct MemoryGateway {
    records: Mutex<Vec<Application>>,
    calls: Mutex<Vec<&'static str>>,
    refusal: Mutex<Option<(u16, String)>>,
    ignore_transitions: Mutex<bool>,
    reported: Mutex<Option<ApplicationStatistics>>,
}

impl MemoryGateway {
    pub(super) fn with_applications(applications: Vec<Application>) -> Self {
        Self {
            records: Mutex::new(applications),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn refuse_with(&self, status: u16, message: &str) {
        *self.refusal.lock().expect("refusal mutex poisoned") = Some((status, message.to_string()));
    }

    pub(super) fn ignore_transitions(&self) {
        *self.ignore_transitions.lock().expect("flag mutex poisoned") = true;
    }

    pub(super) fn report(&self, statistics: ApplicationStatistics) {
        *self.reported.lock().expect("stats mutex poisoned") = Some(statistics);
    }

    pub(super) fn stored(&self, id: i64) -> Option<Application> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .find(|application| application.id == ApplicationId(id))
            .cloned()
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().expect("calls mutex poisoned").push(call);
        match self.refusal.lock().expect("refusal mutex poisoned").clone() {
            Some((status, message)) => Err(ApiError::Status { status, message }),
            None => Ok(()),
        }
    }

    fn move_to(
        &self,
        request: &ApplicationRequest,
        target: ApplicationStatus,
    ) -> Result<Application, ApiError> {
        let mut records = self.records.lock().expect("records mutex poisoned");
        let record = records
            .iter_mut()
            .find(|application| {
                application.vacancy_id == request.vacancy_id
                    && application.candidate_id == request.candidate_id
                    && application.resume_id == request.resume_id
            })
            .ok_or(ApiError::Status {
                status: 404,
                message: "Application not found".to_string(),
            })?;

        if !record.status.can_transition_to(target) {
            return Err(ApiError::Status {
                status: 409,
                message: "Application already processed".to_string(),
            });
        }
        if !*self.ignore_transitions.lock().expect("flag mutex poisoned") {
            record.status = target.into();
        }
        Ok(record.clone())
    }
}

#[async_trait]
impl ApplicationGateway for MemoryGateway {
    async fn create(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.record("create")?;
        let mut records = self.records.lock().expect("records mutex poisoned");
        let id = records.len() as i64 + 1;
        let created = Application {
            id: ApplicationId(id),
            vacancy_id: request.vacancy_id,
            candidate_id: request.candidate_id,
            resume_id: request.resume_id,
            employer_id: Some(request.employer_id),
            status: ApplicationStatus::Pending.into(),
            created_at: Utc::now(),
        };
        records.push(created.clone());
        Ok(created)
    }

    async fn by_employer(&self, employer_id: UserId) -> Result<Vec<Application>, ApiError> {
        self.record("by_employer")?;
        Ok(self
            .records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .filter(|application| application.employer_id.map_or(true, |id| id == employer_id))
            .cloned()
            .collect())
    }

    async fn by_candidate(&self, _candidate_id: UserId) -> Result<Vec<Application>, ApiError> {
        self.record("by_candidate")?;
        // Unscoped on purpose: the board has to drop foreign rows itself.
        Ok(self.records.lock().expect("records mutex poisoned").clone())
    }

    async fn by_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<Application>, ApiError> {
        self.record("by_vacancy")?;
        Ok(self
            .records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .filter(|application| application.vacancy_id == vacancy_id)
            .cloned()
            .collect())
    }

    async fn reject(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.record("reject")?;
        self.move_to(request, ApplicationStatus::Rejected)
    }

    async fn withdraw(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.record("withdraw")?;
        self.move_to(request, ApplicationStatus::Withdrawn)
    }

    async fn employer_statistics(
        &self,
        _employer_id: UserId,
    ) -> Result<ApplicationStatistics, ApiError> {
        self.record("employer_statistics")?;
        Ok(self
            .reported
            .lock()
            .expect("stats mutex poisoned")
            .clone()
            .unwrap_or_default())
    }
}

pub(super) fn reported(total: u64, rows: &[(&str, u64)]) -> ApplicationStatistics {
    ApplicationStatistics {
        total_applications: total,
        applications_by_status: rows
            .iter()
            .map(|(literal, count)| (literal.to_string(), *count))
            .collect::<BTreeMap<_, _>>(),
    }
}

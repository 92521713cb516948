use std::sync::Arc;

use tracing::{info, warn};

use super::board::ApplicationBoard;
use super::gateway::ApplicationGateway;
use super::policy::{ApplicationAction, ApplicationPolicy, PolicyDenial};
use super::statistics::{ReconciledStatistics, StatisticsMismatch};
use super::status::{ApplicationStatus, RecordedStatus};
use crate::api::ApiError;
use crate::domain::{
    Application, ApplicationId, ApplicationRequest, Resume, ResumeId, Role, Vacancy, VacancyId,
};
use crate::session::Identity;

/// Drives submissions and the `Pending -> Rejected/Withdrawn` transitions
/// against the backend, refusing locally what the policy already forbids.
pub struct ApplicationWorkflow<G> {
    gateway: Arc<G>,
}

impl<G> Clone for ApplicationWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> ApplicationWorkflow<G>
where
    G: ApplicationGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Submit `resume` against `vacancy` on behalf of a job seeker.
    pub async fn submit(
        &self,
        viewer: &Identity,
        vacancy: &Vacancy,
        resume: Option<&Resume>,
    ) -> Result<Application, WorkflowError> {
        require_role(viewer, Role::JobSeeker, "apply")?;
        let resume = resume.ok_or(WorkflowError::ResumeRequired)?;
        if resume.user_id != viewer.user_id {
            return Err(WorkflowError::ResumeNotOwned(resume.id));
        }
        if !vacancy.is_published {
            return Err(WorkflowError::VacancyNotPublished(vacancy.id));
        }

        let request = ApplicationRequest {
            vacancy_id: vacancy.id,
            employer_id: vacancy.employer_id,
            candidate_id: viewer.user_id,
            resume_id: resume.id,
        };
        let created = self.gateway.create(&request).await?;
        if !created.status.is_initial() {
            warn!(
                application_id = %created.id,
                status = %created.status,
                "backend created application outside the initial state"
            );
        }

        info!(
            application_id = %created.id,
            vacancy_id = %vacancy.id,
            candidate = %viewer.user_id,
            "application submitted"
        );
        Ok(created)
    }

    pub async fn employer_board(&self, viewer: &Identity) -> Result<ApplicationBoard, WorkflowError> {
        require_role(viewer, Role::Employer, "list received applications")?;
        let applications = self.gateway.by_employer(viewer.user_id).await?;
        Ok(ApplicationBoard::employer_listing(*viewer, applications))
    }

    pub async fn candidate_board(&self, viewer: &Identity) -> Result<ApplicationBoard, WorkflowError> {
        require_role(viewer, Role::JobSeeker, "list own applications")?;
        let applications = self.gateway.by_candidate(viewer.user_id).await?;
        Ok(ApplicationBoard::new(*viewer, applications))
    }

    pub async fn vacancy_board(
        &self,
        viewer: &Identity,
        vacancy: &Vacancy,
    ) -> Result<ApplicationBoard, WorkflowError> {
        require_role(viewer, Role::Employer, "list vacancy applications")?;
        let applications = self.gateway.by_vacancy(vacancy.id).await?;
        Ok(ApplicationBoard::scoped_to_vacancy(*viewer, vacancy, applications))
    }

    pub async fn reject(
        &self,
        board: &mut ApplicationBoard,
        id: ApplicationId,
    ) -> Result<Application, WorkflowError> {
        self.transition(board, id, ApplicationAction::Reject).await
    }

    pub async fn withdraw(
        &self,
        board: &mut ApplicationBoard,
        id: ApplicationId,
    ) -> Result<Application, WorkflowError> {
        self.transition(board, id, ApplicationAction::Withdraw).await
    }

    /// Employer-scoped list and backend statistics, fetched concurrently and
    /// checked against each other.
    pub async fn employer_statistics(
        &self,
        viewer: &Identity,
    ) -> Result<(ApplicationBoard, ReconciledStatistics), WorkflowError> {
        require_role(viewer, Role::Employer, "view application statistics")?;
        let (applications, reported) = tokio::try_join!(
            self.gateway.by_employer(viewer.user_id),
            self.gateway.employer_statistics(viewer.user_id),
        )?;

        let board = ApplicationBoard::employer_listing(*viewer, applications);
        let reconciled = ReconciledStatistics::reconcile(reported, board.applications())?;
        Ok((board, reconciled))
    }

    async fn transition(
        &self,
        board: &mut ApplicationBoard,
        id: ApplicationId,
        action: ApplicationAction,
    ) -> Result<Application, WorkflowError> {
        let viewer = *board.viewer();
        let current = board
            .get(id)
            .cloned()
            .ok_or(WorkflowError::UnknownApplication(id))?;

        ApplicationPolicy::authorize(&viewer, &current, action)
            .map_err(|denial| WorkflowError::denied(&current, action, denial))?;

        // Older records may lack an employer; the acting account fills the gap.
        let request = current.to_request(viewer.user_id);
        let (updated, target) = match action {
            ApplicationAction::Reject => (
                self.gateway.reject(&request).await?,
                ApplicationStatus::Rejected,
            ),
            ApplicationAction::Withdraw => (
                self.gateway.withdraw(&request).await?,
                ApplicationStatus::Withdrawn,
            ),
            ApplicationAction::View => return Ok(current),
        };

        if updated.status != target {
            warn!(
                application_id = %id,
                expected = %target,
                actual = %updated.status,
                "backend did not apply transition"
            );
            return Err(WorkflowError::TransitionNotApplied {
                id,
                status: updated.status,
            });
        }

        info!(
            application_id = %id,
            from = %current.status,
            to = %updated.status,
            actor = %viewer.user_id,
            "application status changed"
        );
        board.apply(updated.clone());
        Ok(updated)
    }
}

fn require_role(viewer: &Identity, expected: Role, action: &'static str) -> Result<(), WorkflowError> {
    if viewer.role == expected {
        Ok(())
    } else {
        Err(WorkflowError::WrongRole { expected, action })
    }
}

/// Error raised by the application workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Please select a resume")]
    ResumeRequired,
    #[error("resume {0} does not belong to the current account")]
    ResumeNotOwned(ResumeId),
    #[error("vacancy {0} is not published")]
    VacancyNotPublished(VacancyId),
    #[error("{action} requires the {expected} role")]
    WrongRole { expected: Role, action: &'static str },
    #[error("application {0} does not belong to the current account")]
    NotOwner(ApplicationId),
    #[error("application {0} is not on this board")]
    UnknownApplication(ApplicationId),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application {id} has status '{status}', which cannot be changed here")]
    UnrecognizedStatus { id: ApplicationId, status: String },
    #[error("backend left application {id} in status {status}")]
    TransitionNotApplied {
        id: ApplicationId,
        status: RecordedStatus,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    StatisticsMismatch(#[from] StatisticsMismatch),
}

impl WorkflowError {
    fn denied(
        current: &Application,
        action: ApplicationAction,
        denial: PolicyDenial,
    ) -> Self {
        let id = current.id;
        match denial {
            PolicyDenial::WrongRole { expected } => WorkflowError::WrongRole {
                expected,
                action: match action {
                    ApplicationAction::Reject => "reject",
                    ApplicationAction::Withdraw => "withdraw",
                    ApplicationAction::View => "view",
                },
            },
            PolicyDenial::NotOwner => WorkflowError::NotOwner(id),
            PolicyDenial::InvalidTransition { from, to } => {
                WorkflowError::InvalidTransition { from, to }
            }
            PolicyDenial::UnrecognizedStatus => WorkflowError::UnrecognizedStatus {
                id,
                status: current.status.to_string(),
            },
        }
    }
}

use tracing::warn;

use super::policy::{ApplicationAction, ApplicationPolicy};
use super::statistics::StatusCounts;
use super::status::StatusFilter;
use crate::domain::{Application, ApplicationId, Vacancy};
use crate::session::Identity;

/// Applications visible to one account, as shown on a listing page.
///
/// Every record on the board passes [`ApplicationPolicy::can_view`] for the viewer.
#[derive(Debug, Clone)]
pub struct ApplicationBoard {
    viewer: Identity,
    applications: Vec<Application>,
}

impl ApplicationBoard {
    /// Keeps only the records the viewer owns; the rest are dropped and logged.
    pub fn new(viewer: Identity, applications: Vec<Application>) -> Self {
        let applications = applications
            .into_iter()
            .filter(|application| {
                let visible = ApplicationPolicy::can_view(&viewer, application);
                if !visible {
                    warn!(
                        application_id = %application.id,
                        viewer = %viewer.user_id,
                        role = %viewer.role,
                        "dropping application not owned by viewer"
                    );
                }
                visible
            })
            .collect();

        Self {
            viewer,
            applications,
        }
    }

    /// Board for a list fetched from `/employer/{id}`. The backend omits
    /// `employerId` on some rows of that endpoint; they belong to the viewer.
    pub fn employer_listing(viewer: Identity, mut applications: Vec<Application>) -> Self {
        for application in &mut applications {
            application.employer_id.get_or_insert(viewer.user_id);
        }
        Self::new(viewer, applications)
    }

    /// Board for the applications of one vacancy. Rows inherit the vacancy's
    /// employer when they carry none; a vacancy the viewer does not own yields
    /// an empty board.
    pub fn scoped_to_vacancy(
        viewer: Identity,
        vacancy: &Vacancy,
        mut applications: Vec<Application>,
    ) -> Self {
        if vacancy.employer_id != viewer.user_id {
            warn!(
                vacancy_id = %vacancy.id,
                viewer = %viewer.user_id,
                "vacancy not owned by viewer; hiding its applications"
            );
            applications.clear();
        }

        applications.retain(|application| application.vacancy_id == vacancy.id);
        for application in &mut applications {
            application.employer_id.get_or_insert(vacancy.employer_id);
        }
        Self::new(viewer, applications)
    }

    pub fn viewer(&self) -> &Identity {
        &self.viewer
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn into_applications(self) -> Vec<Application> {
        self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    pub fn get(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|application| application.id == id)
    }

    pub fn filtered(&self, filter: StatusFilter) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|application| filter.matches(&application.status))
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_applications(&self.applications)
    }

    pub fn actions_for(&self, application: &Application) -> Vec<ApplicationAction> {
        ApplicationPolicy::available_actions(&self.viewer, application)
    }

    /// Replaces the record with the server's version. Returns `false` when the
    /// board holds no record with that id.
    pub fn apply(&mut self, updated: Application) -> bool {
        match self
            .applications
            .iter_mut()
            .find(|application| application.id == updated.id)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}

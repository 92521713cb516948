use serde::Serialize;

use super::status::ApplicationStatus;
use crate::domain::{Application, Role};
use crate::session::Identity;

/// Actions a page may offer on an application row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationAction {
    View,
    Reject,
    Withdraw,
}

impl ApplicationAction {
    /// Status the application lands in once the action succeeds.
    pub const fn target_status(self) -> Option<ApplicationStatus> {
        match self {
            ApplicationAction::View => None,
            ApplicationAction::Reject => Some(ApplicationStatus::Rejected),
            ApplicationAction::Withdraw => Some(ApplicationStatus::Withdrawn),
        }
    }

    /// Role allowed to perform the action; `None` means either party.
    pub const fn required_role(self) -> Option<Role> {
        match self {
            ApplicationAction::View => None,
            ApplicationAction::Reject => Some(Role::Employer),
            ApplicationAction::Withdraw => Some(Role::JobSeeker),
        }
    }
}

/// Why the policy refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDenial {
    WrongRole { expected: Role },
    NotOwner,
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    /// The row's status is not one the client knows how to move.
    UnrecognizedStatus,
}

/// Role- and ownership-based rules for application visibility and transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationPolicy;

impl ApplicationPolicy {
    /// Employers see applications addressed to them, candidates see their own.
    pub fn can_view(viewer: &Identity, application: &Application) -> bool {
        match viewer.role {
            Role::Employer => application.employer_id == Some(viewer.user_id),
            Role::JobSeeker => application.candidate_id == viewer.user_id,
        }
    }

    pub fn authorize(
        viewer: &Identity,
        application: &Application,
        action: ApplicationAction,
    ) -> Result<(), PolicyDenial> {
        if let Some(expected) = action.required_role() {
            if viewer.role != expected {
                return Err(PolicyDenial::WrongRole { expected });
            }
        }

        if !Self::can_view(viewer, application) {
            return Err(PolicyDenial::NotOwner);
        }

        let Some(to) = action.target_status() else {
            return Ok(());
        };
        match application.status.known() {
            Some(from) if !from.can_transition_to(to) => {
                Err(PolicyDenial::InvalidTransition { from, to })
            }
            Some(_) => Ok(()),
            None => Err(PolicyDenial::UnrecognizedStatus),
        }
    }

    /// Actions worth rendering for this viewer on this row.
    pub fn available_actions(viewer: &Identity, application: &Application) -> Vec<ApplicationAction> {
        [
            ApplicationAction::View,
            ApplicationAction::Reject,
            ApplicationAction::Withdraw,
        ]
        .into_iter()
        .filter(|action| Self::authorize(viewer, application, *action).is_ok())
        .collect()
    }
}

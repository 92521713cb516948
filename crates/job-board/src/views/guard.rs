use tracing::debug;

use super::ViewError;
use crate::domain::Role;
use crate::session::{Identity, Session};

pub const LOGIN_PATH: &str = "/auth/login";

/// Pages reachable without signing in.
const PUBLIC_PREFIXES: [&str; 2] = ["/auth/", "/jobseeker/vacancies"];

/// Decides who may open a page.
pub struct RouteGuard;

impl RouteGuard {
    /// Grants the identity when the session belongs to `role`. Anyone else is
    /// sent to the login page; only a discarded token also ends the session.
    pub fn require(session: &Session, role: Role) -> Result<Identity, ViewError> {
        let identity = Self::require_any(session)?;
        if identity.role == role {
            return Ok(identity);
        }
        debug!(user_id = %identity.user_id, have = %identity.role, need = %role, "role mismatch");
        Err(ViewError::Redirect(LOGIN_PATH))
    }

    /// Any signed-in account.
    pub fn require_any(session: &Session) -> Result<Identity, ViewError> {
        match session.identity() {
            Some(identity) => Ok(*identity),
            None if session.token_discarded() => Err(ViewError::SessionExpired),
            None => Err(ViewError::Redirect(LOGIN_PATH)),
        }
    }

    pub fn is_public(path: &str) -> bool {
        if path == "/" {
            return true;
        }
        if is_vacancy_detail(path) {
            return false;
        }
        PUBLIC_PREFIXES
            .iter()
            .any(|prefix| path == prefix.trim_end_matches('/') || path.starts_with(prefix))
    }
}

/// `/jobseeker/vacancies/{id}` needs an account; only the listing is public.
fn is_vacancy_detail(path: &str) -> bool {
    path.strip_prefix("/jobseeker/vacancies/")
        .is_some_and(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::session::claims::tests::token_for;
    use crate::session::MemoryTokenStore;

    fn session_for(role: &str) -> Session {
        let exp = Some(Utc::now().timestamp() + 600);
        Session::restore(Arc::new(MemoryTokenStore::with_token(token_for(5, role, exp))))
    }

    #[test]
    fn matching_role_is_granted() {
        let identity = RouteGuard::require(&session_for("EMPLOYER"), Role::Employer)
            .expect("employer allowed");
        assert_eq!(identity.role, Role::Employer);
    }

    #[test]
    fn other_role_and_anonymous_redirect_to_login() {
        for session in [
            session_for("JOB_SEEKER"),
            Session::anonymous(Arc::new(MemoryTokenStore::default())),
        ] {
            assert!(matches!(
                RouteGuard::require(&session, Role::Employer),
                Err(ViewError::Redirect(LOGIN_PATH))
            ));
        }
    }

    #[test]
    fn expired_token_ends_the_session() {
        let exp = Some(Utc::now().timestamp() - 60);
        let session =
            Session::restore(Arc::new(MemoryTokenStore::with_token(token_for(5, "EMPLOYER", exp))));
        assert!(matches!(
            RouteGuard::require(&session, Role::Employer),
            Err(ViewError::SessionExpired)
        ));
        assert!(matches!(
            RouteGuard::require_any(&session),
            Err(ViewError::SessionExpired)
        ));
    }

    #[test]
    fn public_paths() {
        assert!(RouteGuard::is_public("/"));
        assert!(RouteGuard::is_public("/auth/login"));
        assert!(RouteGuard::is_public("/jobseeker/vacancies"));
        assert!(!RouteGuard::is_public("/jobseeker/vacancies/4"));
        assert!(!RouteGuard::is_public("/employer/dashboard"));
    }
}

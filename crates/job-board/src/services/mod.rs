//! One facade per backend resource. They build paths and parameters and
//! nothing else.

pub mod applications;
pub mod auth;
pub mod companies;
pub mod resumes;
pub mod users;
pub mod vacancies;

use crate::api::ApiClient;
use crate::workflows::applications::StatusVocabulary;

pub use applications::ApplicationService;
pub use auth::AuthService;
pub use companies::CompanyService;
pub use resumes::{EducationService, ResumeService, SkillService};
pub use users::UserService;
pub use vacancies::VacancyService;

/// All facades over one [`ApiClient`], so they share its token store.
#[derive(Debug, Clone)]
pub struct JobBoardApi {
    client: ApiClient,
    vocabulary: StatusVocabulary,
}

impl JobBoardApi {
    pub fn new(client: ApiClient, vocabulary: StatusVocabulary) -> Self {
        Self { client, vocabulary }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    pub fn vacancies(&self) -> VacancyService {
        VacancyService::new(self.client.clone())
    }

    pub fn companies(&self) -> CompanyService {
        CompanyService::new(self.client.clone())
    }

    pub fn resumes(&self) -> ResumeService {
        ResumeService::new(self.client.clone())
    }

    pub fn educations(&self) -> EducationService {
        EducationService::new(self.client.clone())
    }

    pub fn skills(&self) -> SkillService {
        SkillService::new(self.client.clone())
    }

    pub fn applications(&self) -> ApplicationService {
        ApplicationService::new(self.client.clone(), self.vocabulary)
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.client.clone())
    }
}

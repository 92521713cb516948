use async_trait::async_trait;

use crate::api::ApiError;
use crate::domain::{Application, ApplicationRequest, ApplicationStatistics, UserId, VacancyId};

/// Backend operations the workflow needs; implemented over HTTP by
/// [`crate::services::ApplicationService`] and in memory by the tests.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    async fn create(&self, request: &ApplicationRequest) -> Result<Application, ApiError>;
    async fn by_employer(&self, employer_id: UserId) -> Result<Vec<Application>, ApiError>;
    async fn by_candidate(&self, candidate_id: UserId) -> Result<Vec<Application>, ApiError>;
    async fn by_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<Application>, ApiError>;
    async fn reject(&self, request: &ApplicationRequest) -> Result<Application, ApiError>;
    async fn withdraw(&self, request: &ApplicationRequest) -> Result<Application, ApiError>;
    async fn employer_statistics(
        &self,
        employer_id: UserId,
    ) -> Result<ApplicationStatistics, ApiError>;
}

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::domain::{
    Application, ApplicationId, ApplicationRequest, ApplicationStatistics, UserId, VacancyId,
};
use crate::workflows::applications::{ApplicationGateway, ApplicationStatus, StatusVocabulary};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    client: ApiClient,
    vocabulary: StatusVocabulary,
}

impl ApplicationService {
    pub fn new(client: ApiClient, vocabulary: StatusVocabulary) -> Self {
        Self { client, vocabulary }
    }

    pub async fn create(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.client.post("/api/applications", request).await
    }

    pub async fn get_by_id(&self, id: ApplicationId) -> Result<Application, ApiError> {
        self.client.get(&format!("/api/applications/{id}")).await
    }

    pub async fn get_by_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<Application>, ApiError> {
        self.client
            .get(&format!("/api/applications/vacancy/{vacancy_id}"))
            .await
    }

    pub async fn get_by_candidate(
        &self,
        candidate_id: UserId,
    ) -> Result<Vec<Application>, ApiError> {
        self.client
            .get(&format!("/api/applications/candidate/{candidate_id}"))
            .await
    }

    pub async fn get_by_employer(&self, employer_id: UserId) -> Result<Vec<Application>, ApiError> {
        self.client
            .get(&format!("/api/applications/employer/{employer_id}"))
            .await
    }

    /// Global listing across every employer. Pages never call this; they use
    /// the account-scoped listings instead.
    pub async fn get_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, ApiError> {
        self.client
            .get(&format!(
                "/api/applications/status/{}",
                status.as_wire(self.vocabulary)
            ))
            .await
    }

    pub async fn reject(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.client.post("/api/applications/reject", request).await
    }

    pub async fn withdraw(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        self.client.post("/api/applications/withdrawn", request).await
    }

    pub async fn statistics(&self) -> Result<ApplicationStatistics, ApiError> {
        self.client.get("/api/applications/statistics").await
    }

    pub async fn employer_statistics(
        &self,
        employer_id: UserId,
    ) -> Result<ApplicationStatistics, ApiError> {
        self.client
            .get(&format!("/api/applications/employer/{employer_id}/statistics"))
            .await
    }
}

#[async_trait]
impl ApplicationGateway for ApplicationService {
    async fn create(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        ApplicationService::create(self, request).await
    }

    async fn by_employer(&self, employer_id: UserId) -> Result<Vec<Application>, ApiError> {
        self.get_by_employer(employer_id).await
    }

    async fn by_candidate(&self, candidate_id: UserId) -> Result<Vec<Application>, ApiError> {
        self.get_by_candidate(candidate_id).await
    }

    async fn by_vacancy(&self, vacancy_id: VacancyId) -> Result<Vec<Application>, ApiError> {
        self.get_by_vacancy(vacancy_id).await
    }

    async fn reject(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        ApplicationService::reject(self, request).await
    }

    async fn withdraw(&self, request: &ApplicationRequest) -> Result<Application, ApiError> {
        ApplicationService::withdraw(self, request).await
    }

    async fn employer_statistics(
        &self,
        employer_id: UserId,
    ) -> Result<ApplicationStatistics, ApiError> {
        ApplicationService::employer_statistics(self, employer_id).await
    }
}

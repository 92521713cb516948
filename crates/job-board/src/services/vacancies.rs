use crate::api::{ApiClient, ApiError};
use crate::domain::{NewVacancy, Page, PageRequest, UserId, Vacancy, VacancyId};

#[derive(Debug, Clone)]
pub struct VacancyService {
    client: ApiClient,
}

impl VacancyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, page: PageRequest) -> Result<Page<Vacancy>, ApiError> {
        self.client.get_with_query("/api/vacancies", &page).await
    }

    pub async fn get_by_id(&self, id: VacancyId) -> Result<Vacancy, ApiError> {
        self.client.get(&format!("/api/vacancies/{id}")).await
    }

    pub async fn get_by_employer(
        &self,
        employer_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Vacancy>, ApiError> {
        self.client
            .get_with_query(&format!("/api/vacancies/employer/{employer_id}"), &page)
            .await
    }

    pub async fn create(&self, vacancy: &NewVacancy) -> Result<Vacancy, ApiError> {
        self.client.post("/api/vacancies", vacancy).await
    }

    pub async fn update(&self, vacancy: &Vacancy) -> Result<Vacancy, ApiError> {
        self.client.post("/api/vacancies/update", vacancy).await
    }

    pub async fn publish(&self, id: VacancyId) -> Result<(), ApiError> {
        self.client.patch(&format!("/api/vacancies/{id}/publish")).await
    }

    pub async fn unpublish(&self, id: VacancyId) -> Result<(), ApiError> {
        self.client
            .patch(&format!("/api/vacancies/{id}/unpublish"))
            .await
    }

    pub async fn delete(&self, id: VacancyId) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/vacancies/{id}")).await
    }
}

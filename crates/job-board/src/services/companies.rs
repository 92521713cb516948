use crate::api::{ApiClient, ApiError};
use crate::domain::{Company, CompanyId, NewCompany};

#[derive(Debug, Clone)]
pub struct CompanyService {
    client: ApiClient,
}

impl CompanyService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every company the backend knows about; callers filter by owner.
    pub async fn get_all(&self) -> Result<Vec<Company>, ApiError> {
        self.client.get("/api/companies").await
    }

    pub async fn get_by_id(&self, id: CompanyId) -> Result<Company, ApiError> {
        self.client.get(&format!("/api/companies/{id}")).await
    }

    pub async fn create(&self, company: &NewCompany) -> Result<Company, ApiError> {
        self.client.post("/api/companies", company).await
    }

    pub async fn delete(&self, id: CompanyId) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/companies/{id}")).await
    }
}

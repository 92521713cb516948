use crate::api::{ApiClient, ApiError};
use crate::domain::{ProfileUpdate, UserId, UserProfile};

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.client.get(&format!("/api/users/{id}/profile")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.client.post_unit("/api/users/update", update).await
    }
}

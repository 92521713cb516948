use crate::api::{ApiClient, ApiError};
use crate::domain::{
    Education, NewEducation, NewResume, NewSkill, Page, PageRequest, Resume, ResumeId, Skill,
    UserId,
};

#[derive(Debug, Clone)]
pub struct ResumeService {
    client: ApiClient,
}

impl ResumeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, page: PageRequest) -> Result<Page<Resume>, ApiError> {
        self.client.get_with_query("/api/resumes", &page).await
    }

    pub async fn get_by_id(&self, id: ResumeId) -> Result<Resume, ApiError> {
        self.client.get(&format!("/api/resumes/{id}")).await
    }

    pub async fn get_by_user(&self, user_id: UserId) -> Result<Vec<Resume>, ApiError> {
        self.client.get(&format!("/api/resumes/user/{user_id}")).await
    }

    pub async fn create(&self, resume: &NewResume) -> Result<Resume, ApiError> {
        self.client.post("/api/resumes", resume).await
    }

    pub async fn update(&self, resume: &Resume) -> Result<Resume, ApiError> {
        self.client.post("/api/resumes/update", resume).await
    }

    pub async fn publish(&self, id: ResumeId) -> Result<(), ApiError> {
        self.client.patch(&format!("/api/resumes/{id}/publish")).await
    }

    pub async fn unpublish(&self, id: ResumeId) -> Result<(), ApiError> {
        self.client.patch(&format!("/api/resumes/{id}/unpublish")).await
    }

    pub async fn delete(&self, id: ResumeId) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/resumes/{id}")).await
    }
}

#[derive(Debug, Clone)]
pub struct EducationService {
    client: ApiClient,
}

impl EducationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_by_resume(&self, resume_id: ResumeId) -> Result<Vec<Education>, ApiError> {
        self.client
            .get(&format!("/api/educations/resume/{resume_id}"))
            .await
    }

    pub async fn create(&self, education: &NewEducation) -> Result<Education, ApiError> {
        self.client.post("/api/educations", education).await
    }

    pub async fn update(&self, education: &Education) -> Result<Education, ApiError> {
        self.client
            .put(&format!("/api/educations/{}", education.id), education)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct SkillService {
    client: ApiClient,
}

impl SkillService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_by_resume(&self, resume_id: ResumeId) -> Result<Vec<Skill>, ApiError> {
        self.client
            .get(&format!("/api/skills/resume/{resume_id}"))
            .await
    }

    pub async fn create(&self, skill: &NewSkill) -> Result<Skill, ApiError> {
        self.client.post("/api/skills", skill).await
    }

    pub async fn update(&self, skill: &Skill) -> Result<Skill, ApiError> {
        self.client
            .put(&format!("/api/skills/{}", skill.id), skill)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/skills/{id}")).await
    }
}

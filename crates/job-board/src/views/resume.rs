use serde::Serialize;

use super::{PageContext, ViewError};
use crate::domain::{Education, Resume, ResumeId, Skill};

/// A resume with its child sections. A section with no entries is `None`
/// and left out of the rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub resume: Resume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<Skill>>,
}

impl ResumeView {
    pub fn new(resume: Resume, education: Vec<Education>, skills: Vec<Skill>) -> Self {
        Self {
            resume,
            education: non_empty(education),
            skills: non_empty(skills),
        }
    }

    /// Resume, education and skills fetched concurrently.
    pub async fn load(ctx: &PageContext, id: ResumeId) -> Result<Self, ViewError> {
        let api = ctx.api();
        let (resume_service, education_service, skill_service) =
            (api.resumes(), api.educations(), api.skills());
        let (resume, education, skills) = tokio::try_join!(
            resume_service.get_by_id(id),
            education_service.get_by_resume(id),
            skill_service.get_by_resume(id),
        )?;
        Ok(Self::new(resume, education, skills))
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn resume() -> Resume {
        Resume {
            id: ResumeId(3),
            user_id: UserId(20),
            title: "Backend developer".to_string(),
            summary: None,
            experience_years: Some(4),
            contact_email: None,
            contact_phone: None,
            is_published: true,
        }
    }

    #[test]
    fn empty_sections_are_omitted() {
        let view = ResumeView::new(resume(), Vec::new(), Vec::new());
        assert_eq!(view.education, None);
        assert_eq!(view.skills, None);

        let json = serde_json::to_value(&view).expect("serializes");
        assert!(json.get("education").is_none());
        assert!(json.get("skills").is_none());
    }

    #[test]
    fn filled_sections_are_kept() {
        let skill = Skill {
            id: 1,
            resume_id: ResumeId(3),
            name: "Rust".to_string(),
        };
        let view = ResumeView::new(resume(), Vec::new(), vec![skill]);
        let json = serde_json::to_value(&view).expect("serializes");
        assert_eq!(json["skills"][0]["name"], "Rust");
        assert!(json.get("education").is_none());
    }
}

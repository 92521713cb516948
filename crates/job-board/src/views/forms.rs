use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CompanyId, LoginRequest, NewCompany, NewEducation, NewResume, NewVacancy, ProfileUpdate,
    RegisterRequest, Resume, ResumeId, Role, UserId,
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern compiles")
});
static ACCOUNT_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("phone pattern compiles"));
static COMPANY_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+7|8|\+380|\+375)\d{9,11}$").expect("company phone pattern compiles")
});
static RESUME_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[- 0-9()]{7,20}$").expect("contact phone pattern compiles"));
static WEBSITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("website pattern compiles"));

/// Field errors collected before anything is sent to the backend. Only the
/// first problem per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error not tied to one input, e.g. a missing prerequisite.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    fn required(&mut self, field: &'static str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, message);
            false
        } else {
            true
        }
    }

    fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize, label: &str) {
        let count = value.chars().count();
        if count < min {
            self.add(field, format!("{label} must be at least {min} characters"));
        } else if count > max {
            self.add(field, format!("{label} must be at most {max} characters"));
        }
    }

    fn pattern(&mut self, field: &'static str, value: &str, pattern: &Regex, message: &str) {
        if !pattern.is_match(value) {
            self.add(field, message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.trim().to_string();
        if errors.required("email", &email, "Email is required") {
            errors.pattern("email", &email, &EMAIL, "Invalid email address");
        }
        errors.required("password", &self.password, "Password is required");

        errors.finish(LoginRequest {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_role: Option<String>,
}

impl RegisterForm {
    pub fn validate(self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();
        let phone_number = self.phone_number.trim().to_string();

        if errors.required("username", &username, "Username is required") {
            errors.length("username", &username, 3, 32, "Username");
        }
        if errors.required("email", &email, "Email is required") {
            errors.pattern("email", &email, &EMAIL, "Invalid email address");
        }
        if errors.required("phoneNumber", &phone_number, "Phone number is required") {
            errors.pattern(
                "phoneNumber",
                &phone_number,
                &ACCOUNT_PHONE,
                "Phone number must be 10-15 digits",
            );
        }
        if errors.required("password", &self.password, "Password is required") {
            errors.length("password", &self.password, 8, 64, "Password");
        }

        let role = self.user_role.as_deref().and_then(Role::parse);
        if role.is_none() {
            errors.add("userRole", "Please select a role");
        }

        match role {
            Some(user_role) if errors.is_empty() => Ok(RegisterRequest {
                username,
                email,
                phone_number,
                password: self.password,
                user_role,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanyForm {
    pub fn validate(self, employer_id: UserId) -> Result<NewCompany, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim().to_string();
        let location = self.location.trim().to_string();
        let email = self.email.trim().to_string();
        let description = non_blank(self.description);
        let phone_number = non_blank(self.phone_number);
        let website = non_blank(self.website);

        if errors.required("name", &name, "Company name is required") {
            errors.length("name", &name, 2, 100, "Name");
        }
        if let Some(description) = &description {
            errors.length("description", description, 0, 2000, "Description");
        }
        errors.required("location", &location, "Location is required");
        if errors.required("email", &email, "Email is required") {
            errors.pattern("email", &email, &EMAIL, "Invalid email address");
        }
        if let Some(phone) = &phone_number {
            errors.pattern("phoneNumber", phone, &COMPANY_PHONE, "Invalid phone number format");
        }
        if let Some(website) = &website {
            errors.pattern("website", website, &WEBSITE, "Website must be a valid URL");
        }

        errors.finish(NewCompany {
            name,
            description,
            location,
            email,
            phone_number,
            website,
            employer_id: Some(employer_id),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub salary: Option<f64>,
}

impl VacancyForm {
    pub fn validate(self, employer_id: UserId) -> Result<NewVacancy, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();

        if errors.required("title", &title, "Title is required") {
            errors.length("title", &title, 3, 255, "Title");
        }
        if errors.required("description", &description, "Description is required") {
            errors.length("description", &description, 0, 5000, "Description");
        }
        if self.company_id.is_none() {
            errors.add("companyId", "Select a company");
        }
        if matches!(self.salary, Some(salary) if salary < 0.0 || !salary.is_finite()) {
            errors.add("salary", "Salary cannot be negative");
        }

        match self.company_id {
            Some(company_id) if errors.is_empty() => Ok(NewVacancy {
                title,
                description,
                salary: self.salary,
                company_id,
                employer_id,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl EducationEntry {
    pub fn for_resume(&self, resume_id: ResumeId) -> NewEducation {
        NewEducation {
            resume_id,
            institution: self.institution.trim().to_string(),
            degree: self.degree.trim().to_string(),
            field_of_study: self.field_of_study.trim().to_string(),
            start_year: self.start_year,
            end_year: self.end_year,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Left out, the resume keeps its current visibility.
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A validated resume plus the child rows to create after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDraft {
    pub resume: NewResume,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
}

impl ResumeDraft {
    /// Applies the draft's fields over an existing resume, keeping its id and owner.
    pub fn merge_into(&self, existing: &Resume) -> Resume {
        Resume {
            id: existing.id,
            user_id: existing.user_id,
            title: self.resume.title.clone(),
            summary: self.resume.summary.clone(),
            experience_years: self.resume.experience_years,
            contact_email: self.resume.contact_email.clone(),
            contact_phone: self.resume.contact_phone.clone(),
            is_published: self.resume.is_published.unwrap_or(existing.is_published),
        }
    }
}

impl ResumeForm {
    pub fn validate(self, user_id: UserId) -> Result<ResumeDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = self.title.trim().to_string();
        let summary = non_blank(self.summary);
        let contact_email = non_blank(self.contact_email);
        let contact_phone = non_blank(self.contact_phone);

        if errors.required("title", &title, "Title is required") {
            errors.length("title", &title, 3, 255, "Title");
        }
        if let Some(summary) = &summary {
            errors.length("summary", summary, 0, 5000, "Summary");
        }
        let experience_years = match self.experience_years {
            Some(years) if years < 0 => {
                errors.add("experienceYears", "Experience cannot be negative");
                None
            }
            Some(years) => match u32::try_from(years) {
                Ok(years) => Some(years),
                Err(_) => {
                    errors.add("experienceYears", "Experience is too large");
                    None
                }
            },
            None => None,
        };
        if let Some(email) = &contact_email {
            errors.pattern("contactEmail", email, &EMAIL, "Invalid email address");
        }
        if let Some(phone) = &contact_phone {
            errors.pattern("contactPhone", phone, &RESUME_PHONE, "Invalid phone number");
        }

        // Partially filled education rows and blank skills are skipped, not rejected.
        let education = self
            .education
            .into_iter()
            .filter(|entry| entry.for_resume(ResumeId(0)).is_complete())
            .collect();
        let skills = self
            .skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();

        errors.finish(ResumeDraft {
            resume: NewResume {
                user_id,
                title,
                summary,
                experience_years,
                contact_email,
                contact_phone,
                is_published: self.is_published,
            },
            education,
            skills,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl ProfileForm {
    pub fn validate(self, id: UserId) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();
        let phone_number = self.phone_number.trim().to_string();

        if errors.required("username", &username, "Username is required") {
            errors.length("username", &username, 3, 32, "Username");
        }
        if errors.required("email", &email, "Email is required") {
            errors.pattern("email", &email, &EMAIL, "Invalid email address");
        }
        if !phone_number.is_empty() {
            errors.pattern(
                "phoneNumber",
                &phone_number,
                &ACCOUNT_PHONE,
                "Phone number must be 10-15 digits",
            );
        }

        errors.finish(ProfileUpdate {
            id,
            username,
            email,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number,
        })
    }
}

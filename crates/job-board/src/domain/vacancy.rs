use serde::{Deserialize, Serialize};

use super::{CompanyId, UserId, VacancyId};

/// A job posting owned by an employer and advertised under one of their companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacancy {
    pub id: VacancyId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub employer_id: UserId,
    #[serde(default)]
    pub is_published: bool,
}

impl Vacancy {
    /// Case-insensitive substring match over title, company name and description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&needle)
            || self
                .company_name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Salary worth showing; zero and absent salaries are hidden.
    pub fn advertised_salary(&self) -> Option<f64> {
        self.salary.filter(|salary| *salary > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVacancy {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    pub company_id: CompanyId,
    pub employer_id: UserId,
}

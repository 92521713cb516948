//! Employer pages. Every function starts at the route guard, so an anonymous
//! or job seeker session never reaches the backend from here.

use serde::Serialize;
use tracing::{info, warn};

use super::forms::{CompanyForm, VacancyForm};
use super::resume::ResumeView;
use super::{ApplicationRow, PageContext, RouteGuard, ValidationErrors, ViewError};
use crate::domain::{
    Application, ApplicationId, Company, Page, PageRequest, ResumeId, Role, Vacancy, VacancyId,
};
use crate::session::{Identity, Session};
use crate::workflows::applications::{ApplicationBoard, StatusCounts, StatusFilter};

const DASHBOARD_VACANCIES: u32 = 5;
pub const VACANCIES_PATH: &str = "/employer/vacancies";
pub const COMPANIES_PATH: &str = "/employer/companies";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDashboard {
    pub vacancies: Vec<Vacancy>,
    pub total_vacancies: u64,
    pub companies: usize,
    pub statistics: StatusCounts,
    pub pending: u64,
}

/// First own vacancies, own companies and the backend's statistics, fetched
/// concurrently.
pub async fn dashboard(ctx: &PageContext, session: &Session) -> Result<EmployerDashboard, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let api = ctx.api();
    let (vacancies, companies, applications) = (api.vacancies(), api.companies(), api.applications());

    let (vacancies, companies, reported) = tokio::try_join!(
        vacancies.get_by_employer(identity.user_id, PageRequest::first(DASHBOARD_VACANCIES)),
        companies.get_all(),
        applications.employer_statistics(identity.user_id),
    )?;

    let statistics = StatusCounts::from_reported_lossy(&reported);
    Ok(EmployerDashboard {
        total_vacancies: vacancies.total_elements,
        vacancies: vacancies.content,
        companies: owned(&identity, companies).len(),
        pending: statistics.pending,
        statistics,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsPage {
    pub filter: StatusFilter,
    pub filter_label: &'static str,
    pub counts: StatusCounts,
    pub statistics: Vec<(&'static str, u64)>,
    pub applications: Vec<ApplicationRow>,
}

/// Applications received by the employer, narrowed by `filter` over the
/// employer-scoped list.
pub async fn applications(
    ctx: &PageContext,
    session: &Session,
    filter: StatusFilter,
) -> Result<ApplicationsPage, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let board = ctx.workflow().employer_board(&identity).await?;
    let counts = board.counts();
    let locale = ctx.locale();

    Ok(ApplicationsPage {
        filter,
        filter_label: filter.label(locale),
        counts,
        statistics: counts.labelled(locale),
        applications: rows(&board, filter, ctx),
    })
}

/// [`applications`] for a raw `?status=` value. The guard runs before the
/// value is parsed, so a signed-out caller is redirected rather than told
/// about the filter.
pub async fn applications_for_query(
    ctx: &PageContext,
    session: &Session,
    status: Option<&str>,
) -> Result<ApplicationsPage, ViewError> {
    RouteGuard::require(session, Role::Employer)?;
    let filter = match status {
        Some(raw) => StatusFilter::parse(raw).ok_or_else(|| {
            ValidationErrors::single("status", format!("Unknown status '{raw}'"))
        })?,
        None => StatusFilter::All,
    };
    applications(ctx, session, filter).await
}

pub async fn reject_application(
    ctx: &PageContext,
    session: &Session,
    id: ApplicationId,
) -> Result<Application, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let workflow = ctx.workflow();
    let mut board = workflow.employer_board(&identity).await?;
    Ok(workflow.reject(&mut board, id).await?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyDetail {
    pub vacancy: Vacancy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    pub counts: StatusCounts,
    pub applications: Vec<ApplicationRow>,
}

/// One own vacancy with the applications it received.
pub async fn vacancy_detail(
    ctx: &PageContext,
    session: &Session,
    id: VacancyId,
) -> Result<VacancyDetail, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let api = ctx.api();
    let (vacancies, applications) = (api.vacancies(), api.applications());
    let (vacancy, received) = tokio::try_join!(
        vacancies.get_by_id(id),
        applications.get_by_vacancy(id),
    )?;
    ensure_owner(&identity, &vacancy)?;

    let board = ApplicationBoard::scoped_to_vacancy(identity, &vacancy, received);
    Ok(VacancyDetail {
        salary: vacancy.advertised_salary(),
        counts: board.counts(),
        applications: rows(&board, StatusFilter::All, ctx),
        vacancy,
    })
}

/// Publishes or withdraws an own vacancy; returns it with the new flag.
pub async fn set_published(
    ctx: &PageContext,
    session: &Session,
    id: VacancyId,
    publish: bool,
) -> Result<Vacancy, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let vacancies = ctx.api().vacancies();
    let mut vacancy = vacancies.get_by_id(id).await?;
    ensure_owner(&identity, &vacancy)?;

    if publish {
        vacancies.publish(id).await?;
    } else {
        vacancies.unpublish(id).await?;
    }
    vacancy.is_published = publish;
    info!(vacancy_id = %id, published = publish, "vacancy visibility changed");
    Ok(vacancy)
}

/// Deletes an own vacancy and returns the listing path to go back to.
pub async fn delete_vacancy(
    ctx: &PageContext,
    session: &Session,
    id: VacancyId,
) -> Result<&'static str, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let vacancies = ctx.api().vacancies();
    let vacancy = vacancies.get_by_id(id).await?;
    ensure_owner(&identity, &vacancy)?;

    vacancies.delete(id).await?;
    info!(vacancy_id = %id, "vacancy deleted");
    Ok(VACANCIES_PATH)
}

pub async fn vacancies(
    ctx: &PageContext,
    session: &Session,
    page: PageRequest,
) -> Result<Page<Vacancy>, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    Ok(ctx
        .api()
        .vacancies()
        .get_by_employer(identity.user_id, page)
        .await?)
}

pub async fn companies(ctx: &PageContext, session: &Session) -> Result<Vec<Company>, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    own_companies(ctx, &identity).await
}

pub async fn create_company(
    ctx: &PageContext,
    session: &Session,
    form: CompanyForm,
) -> Result<Company, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let company = form.validate(identity.user_id)?;
    let created = ctx.api().companies().create(&company).await?;
    info!(company_id = %created.id, employer = %identity.user_id, "company created");
    Ok(created)
}

/// Companies the new-vacancy form may pick from. An employer without any is
/// told to create one first.
pub async fn vacancy_form(ctx: &PageContext, session: &Session) -> Result<Vec<Company>, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let companies = own_companies(ctx, &identity).await?;
    if companies.is_empty() {
        return Err(ViewError::Precondition("Create a company first".to_string()));
    }
    Ok(companies)
}

pub async fn create_vacancy(
    ctx: &PageContext,
    session: &Session,
    form: VacancyForm,
) -> Result<Vacancy, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let companies = own_companies(ctx, &identity).await?;
    if companies.is_empty() {
        return Err(ViewError::Precondition("Create a company first".to_string()));
    }

    let vacancy = form.validate(identity.user_id)?;
    if !companies.iter().any(|company| company.id == vacancy.company_id) {
        return Err(ValidationErrors::single("companyId", "Select a company").into());
    }

    let created = ctx.api().vacancies().create(&vacancy).await?;
    info!(vacancy_id = %created.id, employer = %identity.user_id, "vacancy created");
    Ok(created)
}

/// A candidate's resume. Only resumes attached to one of the employer's own
/// applications may be opened.
pub async fn resume(
    ctx: &PageContext,
    session: &Session,
    id: ResumeId,
) -> Result<ResumeView, ViewError> {
    let identity = RouteGuard::require(session, Role::Employer)?;
    let board = ctx.workflow().employer_board(&identity).await?;
    if !board
        .applications()
        .iter()
        .any(|application| application.resume_id == id)
    {
        warn!(resume_id = %id, viewer = %identity.user_id, "resume not attached to own applications");
        return Err(ViewError::Forbidden(format!(
            "Resume {id} is not attached to your applications"
        )));
    }
    ResumeView::load(ctx, id).await
}

async fn own_companies(ctx: &PageContext, identity: &Identity) -> Result<Vec<Company>, ViewError> {
    let companies = ctx.api().companies().get_all().await?;
    Ok(owned(identity, companies))
}

fn owned(identity: &Identity, companies: Vec<Company>) -> Vec<Company> {
    companies
        .into_iter()
        .filter(|company| company.employer_id == Some(identity.user_id))
        .collect()
}

fn ensure_owner(identity: &Identity, vacancy: &Vacancy) -> Result<(), ViewError> {
    if vacancy.employer_id == identity.user_id {
        return Ok(());
    }
    warn!(
        vacancy_id = %vacancy.id,
        owner = %vacancy.employer_id,
        viewer = %identity.user_id,
        "vacancy belongs to another employer"
    );
    Err(ViewError::Forbidden(format!(
        "Vacancy {} belongs to another employer",
        vacancy.id
    )))
}

fn rows(board: &ApplicationBoard, filter: StatusFilter, ctx: &PageContext) -> Vec<ApplicationRow> {
    board
        .filtered(filter)
        .into_iter()
        .map(|application| ApplicationRow::new(board, application, ctx.locale()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompanyId, UserId};

    fn company(id: i64, owner: Option<i64>) -> Company {
        Company {
            id: CompanyId(id),
            name: format!("Company {id}"),
            description: None,
            location: Some("Moscow".to_string()),
            email: None,
            phone_number: None,
            website: None,
            employer_id: owner.map(UserId),
        }
    }

    fn employer() -> Identity {
        Identity {
            user_id: UserId(10),
            role: Role::Employer,
        }
    }

    #[test]
    fn only_own_companies_are_counted() {
        let companies = vec![company(1, Some(10)), company(2, Some(11)), company(3, None)];
        let owned = owned(&employer(), companies);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, CompanyId(1));
    }

    #[test]
    fn foreign_vacancy_is_forbidden() {
        let vacancy = Vacancy {
            id: VacancyId(4),
            title: "QA".to_string(),
            description: String::new(),
            salary: None,
            company_id: None,
            company_name: None,
            employer_id: UserId(11),
            is_published: true,
        };
        assert!(matches!(
            ensure_owner(&employer(), &vacancy),
            Err(ViewError::Forbidden(_))
        ));
    }
}

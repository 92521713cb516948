//! Job seeker pages: vacancy search and detail, applying, own applications
//! and resume management.

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::forms::ResumeForm;
use super::resume::ResumeView;
use super::{ApplicationRow, PageContext, RouteGuard, ViewError};
use crate::domain::{
    Application, ApplicationId, NewSkill, Page, PageRequest, Resume, ResumeId, Role, Vacancy,
    VacancyId,
};
use crate::session::{Identity, Session};
use crate::workflows::applications::{
    ApplicationBoard, ApplicationStatus, StatusFilter, WorkflowError,
};

const DASHBOARD_VACANCIES: u32 = 5;
pub const SEARCH_PAGE_SIZE: u32 = 10;
pub const APPLICATIONS_PATH: &str = "/jobseeker/applications";
pub const RESUMES_PATH: &str = "/jobseeker/resumes";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerDashboard {
    pub vacancies: Vec<Vacancy>,
    pub resumes: Vec<Resume>,
    pub applications_sent: usize,
    pub active_applications: u64,
}

/// Latest vacancies, own resumes and own applications, fetched concurrently.
pub async fn dashboard(
    ctx: &PageContext,
    session: &Session,
) -> Result<JobSeekerDashboard, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let api = ctx.api();
    let (vacancies, resumes, applications) = (api.vacancies(), api.resumes(), api.applications());

    let (vacancies, resumes, sent) = tokio::try_join!(
        vacancies.get_all(PageRequest::first(DASHBOARD_VACANCIES)),
        resumes.get_by_user(identity.user_id),
        applications.get_by_candidate(identity.user_id),
    )?;

    let board = ApplicationBoard::new(identity, sent);
    Ok(JobSeekerDashboard {
        vacancies: vacancies.content,
        resumes,
        applications_sent: board.len(),
        active_applications: board.counts().get(ApplicationStatus::Pending),
    })
}

/// Public vacancy listing. `query` narrows the fetched page by title,
/// company name or description.
pub async fn vacancy_search(
    ctx: &PageContext,
    page: u32,
    query: Option<&str>,
) -> Result<Page<Vacancy>, ViewError> {
    let mut listing = ctx
        .api()
        .vacancies()
        .get_all(PageRequest::new(page, SEARCH_PAGE_SIZE))
        .await?;
    if let Some(query) = query {
        listing.content.retain(|vacancy| vacancy.matches(query));
    }
    Ok(listing)
}

/// Whether the viewer can apply, and with which resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyEligibility {
    pub can_apply: bool,
    pub resumes: Vec<Resume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_resume: Option<ResumeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl ApplyEligibility {
    pub fn new(vacancy: &Vacancy, resumes: Vec<Resume>) -> Self {
        let selected_resume = resumes.first().map(|resume| resume.id);
        let hint = if resumes.is_empty() {
            Some("Create a resume before applying")
        } else if !vacancy.is_published {
            Some("This vacancy is not accepting applications")
        } else {
            None
        };
        Self {
            can_apply: hint.is_none(),
            resumes,
            selected_resume,
            hint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyDetail {
    pub vacancy: Vacancy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<ApplyEligibility>,
}

/// Vacancy detail for any signed-in account; only job seekers get an apply
/// section.
pub async fn vacancy_detail(
    ctx: &PageContext,
    session: &Session,
    id: VacancyId,
) -> Result<VacancyDetail, ViewError> {
    let identity = RouteGuard::require_any(session)?;
    let api = ctx.api();

    let (vacancy, eligibility) = if identity.role == Role::JobSeeker {
        let (vacancies, resumes) = (api.vacancies(), api.resumes());
        let (vacancy, resumes) = tokio::try_join!(
            vacancies.get_by_id(id),
            resumes.get_by_user(identity.user_id),
        )?;
        let eligibility = ApplyEligibility::new(&vacancy, resumes);
        (vacancy, Some(eligibility))
    } else {
        (api.vacancies().get_by_id(id).await?, None)
    };

    Ok(VacancyDetail {
        salary: vacancy.advertised_salary(),
        vacancy,
        eligibility,
    })
}

/// Submits the chosen resume, falling back to the first one the viewer owns.
pub async fn apply(
    ctx: &PageContext,
    session: &Session,
    vacancy_id: VacancyId,
    resume_id: Option<ResumeId>,
) -> Result<Application, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let api = ctx.api();
    let (vacancies, resumes) = (api.vacancies(), api.resumes());
    let (vacancy, resumes) = tokio::try_join!(
        vacancies.get_by_id(vacancy_id),
        resumes.get_by_user(identity.user_id),
    )?;

    let resume = match resume_id {
        Some(id) => Some(
            resumes
                .iter()
                .find(|resume| resume.id == id)
                .ok_or(WorkflowError::ResumeNotOwned(id))?,
        ),
        None => resumes.first(),
    };

    Ok(ctx.workflow().submit(&identity, &vacancy, resume).await?)
}

/// The viewer's applications, each joined with its vacancy. A vacancy that
/// fails to load leaves its row without one.
pub async fn applications(
    ctx: &PageContext,
    session: &Session,
) -> Result<Vec<ApplicationRow>, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let board = ctx.workflow().candidate_board(&identity).await?;
    let mut rows: Vec<ApplicationRow> = board
        .filtered(StatusFilter::All)
        .into_iter()
        .map(|application| ApplicationRow::new(&board, application, ctx.locale()))
        .collect();

    let mut lookups = JoinSet::new();
    for (index, row) in rows.iter().enumerate() {
        let vacancies = ctx.api().vacancies();
        let vacancy_id = row.application.vacancy_id;
        lookups.spawn(async move { (index, vacancy_id, vacancies.get_by_id(vacancy_id).await) });
    }

    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((index, _, Ok(vacancy))) => rows[index].vacancy = Some(vacancy),
            Ok((_, vacancy_id, Err(err))) => {
                warn!(vacancy_id = %vacancy_id, error = %err, "vacancy lookup failed")
            }
            Err(err) => warn!(error = %err, "vacancy lookup task failed"),
        }
    }

    Ok(rows)
}

pub async fn withdraw(
    ctx: &PageContext,
    session: &Session,
    id: ApplicationId,
) -> Result<Application, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let workflow = ctx.workflow();
    let mut board = workflow.candidate_board(&identity).await?;
    Ok(workflow.withdraw(&mut board, id).await?)
}

pub async fn resumes(ctx: &PageContext, session: &Session) -> Result<Vec<Resume>, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    Ok(ctx.api().resumes().get_by_user(identity.user_id).await?)
}

pub async fn resume(
    ctx: &PageContext,
    session: &Session,
    id: ResumeId,
) -> Result<ResumeView, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let view = ResumeView::load(ctx, id).await?;
    ensure_owner(&identity, &view.resume)?;
    Ok(view)
}

/// Creates the resume, then its complete education entries, then its skills.
pub async fn create_resume(
    ctx: &PageContext,
    session: &Session,
    form: ResumeForm,
) -> Result<ResumeView, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let draft = form.validate(identity.user_id)?;
    let api = ctx.api();

    let resume = api.resumes().create(&draft.resume).await?;
    let mut education = Vec::with_capacity(draft.education.len());
    for entry in &draft.education {
        education.push(api.educations().create(&entry.for_resume(resume.id)).await?);
    }
    let mut skills = Vec::with_capacity(draft.skills.len());
    for name in &draft.skills {
        let skill = NewSkill {
            resume_id: resume.id,
            name: name.clone(),
        };
        skills.push(api.skills().create(&skill).await?);
    }

    info!(
        resume_id = %resume.id,
        education = education.len(),
        skills = skills.len(),
        "resume created"
    );
    Ok(ResumeView::new(resume, education, skills))
}

/// Saves the resume's own fields; education and skills are left untouched.
pub async fn update_resume(
    ctx: &PageContext,
    session: &Session,
    id: ResumeId,
    form: ResumeForm,
) -> Result<Resume, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let draft = form.validate(identity.user_id)?;
    let resumes = ctx.api().resumes();
    let existing = resumes.get_by_id(id).await?;
    ensure_owner(&identity, &existing)?;

    Ok(resumes.update(&draft.merge_into(&existing)).await?)
}

/// Shows or hides an own resume; returns it with the new flag.
pub async fn set_resume_published(
    ctx: &PageContext,
    session: &Session,
    id: ResumeId,
    publish: bool,
) -> Result<Resume, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let resumes = ctx.api().resumes();
    let mut resume = resumes.get_by_id(id).await?;
    ensure_owner(&identity, &resume)?;

    if publish {
        resumes.publish(id).await?;
    } else {
        resumes.unpublish(id).await?;
    }
    resume.is_published = publish;
    info!(resume_id = %id, published = publish, "resume visibility changed");
    Ok(resume)
}

pub async fn delete_resume(
    ctx: &PageContext,
    session: &Session,
    id: ResumeId,
) -> Result<&'static str, ViewError> {
    let identity = RouteGuard::require(session, Role::JobSeeker)?;
    let resumes = ctx.api().resumes();
    let existing = resumes.get_by_id(id).await?;
    ensure_owner(&identity, &existing)?;

    resumes.delete(id).await?;
    info!(resume_id = %id, "resume deleted");
    Ok(RESUMES_PATH)
}

fn ensure_owner(identity: &Identity, resume: &Resume) -> Result<(), ViewError> {
    if resume.user_id == identity.user_id {
        Ok(())
    } else {
        Err(WorkflowError::ResumeNotOwned(resume.id).into())
    }
}

use super::common::*;
use crate::domain::{ApplicationId, Role, VacancyId};
use crate::session::Identity;
use crate::workflows::applications::{
    ApplicationAction, ApplicationBoard, ApplicationPolicy, ApplicationStatus, Locale,
    PolicyDenial, ReconciledStatistics, RecordedStatus, StatisticsMismatch, StatusCounts,
    StatusFilter,
};

#[test]
fn board_drops_records_owned_by_someone_else() {
    let board = ApplicationBoard::new(
        employer(),
        vec![
            application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
            application(2, CANDIDATE, Some(OTHER_EMPLOYER), ApplicationStatus::Pending),
            application(3, CANDIDATE, None, ApplicationStatus::Pending),
        ],
    );

    let ids: Vec<_> = board.applications().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![ApplicationId(1)]);
}

#[test]
fn employer_listing_claims_rows_without_employer() {
    let board = ApplicationBoard::employer_listing(
        employer(),
        vec![application(3, CANDIDATE, None, ApplicationStatus::Accepted)],
    );

    assert_eq!(board.len(), 1);
    assert_eq!(board.applications()[0].employer_id, Some(EMPLOYER));
}

#[test]
fn vacancy_board_requires_vacancy_ownership() {
    let rows = vec![
        application(1, CANDIDATE, None, ApplicationStatus::Pending),
        application(2, OTHER_CANDIDATE, Some(EMPLOYER), ApplicationStatus::Withdrawn),
    ];

    let owned = ApplicationBoard::scoped_to_vacancy(employer(), &vacancy(true), rows.clone());
    assert_eq!(owned.len(), 2);

    let intruder = Identity {
        user_id: OTHER_EMPLOYER,
        role: Role::Employer,
    };
    let foreign = ApplicationBoard::scoped_to_vacancy(intruder, &vacancy(true), rows);
    assert!(foreign.is_empty());
}

#[test]
fn vacancy_board_ignores_rows_for_other_vacancies() {
    let mut stray = application(4, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending);
    stray.vacancy_id = VacancyId(99);

    let board = ApplicationBoard::scoped_to_vacancy(employer(), &vacancy(true), vec![stray]);
    assert!(board.is_empty());
}

#[test]
fn filter_and_counts_agree() {
    let board = ApplicationBoard::new(
        candidate(),
        vec![
            application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
            application(2, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Rejected),
            application(3, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
        ],
    );

    let counts = board.counts();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.pending, 2);
    assert_eq!(board.filtered(StatusFilter::All).len(), 3);
    for status in ApplicationStatus::ALL {
        assert_eq!(
            board.filtered(StatusFilter::Only(status)).len() as u64,
            counts.get(status)
        );
    }
}

#[test]
fn apply_replaces_only_known_records() {
    let mut board = ApplicationBoard::new(
        candidate(),
        vec![application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending)],
    );

    let mut updated = board.applications()[0].clone();
    updated.status = ApplicationStatus::Withdrawn.into();
    assert!(board.apply(updated));
    assert_eq!(
        board.get(ApplicationId(1)).and_then(|a| a.status.known()),
        Some(ApplicationStatus::Withdrawn)
    );

    assert!(!board.apply(application(
        9,
        CANDIDATE,
        Some(EMPLOYER),
        ApplicationStatus::Rejected
    )));
}

#[test]
fn actions_offered_only_on_pending_rows_to_the_right_role() {
    let pending = application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending);
    let rejected = application(2, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Rejected);

    assert_eq!(
        ApplicationPolicy::available_actions(&employer(), &pending),
        vec![ApplicationAction::View, ApplicationAction::Reject]
    );
    assert_eq!(
        ApplicationPolicy::available_actions(&candidate(), &pending),
        vec![ApplicationAction::View, ApplicationAction::Withdraw]
    );
    assert_eq!(
        ApplicationPolicy::available_actions(&employer(), &rejected),
        vec![ApplicationAction::View]
    );
}

#[test]
fn policy_explains_refusals() {
    let foreign = application(1, OTHER_CANDIDATE, Some(OTHER_EMPLOYER), ApplicationStatus::Pending);

    assert_eq!(
        ApplicationPolicy::authorize(&employer(), &foreign, ApplicationAction::Reject),
        Err(PolicyDenial::NotOwner)
    );
    assert_eq!(
        ApplicationPolicy::authorize(&employer(), &foreign, ApplicationAction::Withdraw),
        Err(PolicyDenial::WrongRole {
            expected: Role::JobSeeker
        })
    );
    assert!(!ApplicationPolicy::can_view(&candidate(), &foreign));
}

#[test]
fn reconcile_accepts_mixed_vocabularies() {
    let rows = vec![
        application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
        application(2, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
        application(3, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Withdrawn),
    ];

    let reconciled =
        ReconciledStatistics::reconcile(reported(3, &[("NEW", 1), ("PENDING", 1), ("Отозван", 1)]), &rows)
            .expect("statistics agree");
    assert_eq!(reconciled.counts, StatusCounts::from_applications(&rows));
}

#[test]
fn reconcile_reports_first_disagreement() {
    let rows = vec![application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending)];

    assert_eq!(
        ReconciledStatistics::reconcile(reported(1, &[("REJECTED", 1)]), &rows),
        Err(StatisticsMismatch::CountDiffers {
            status: ApplicationStatus::Pending,
            reported: 0,
            listed: 1,
        })
    );
    assert_eq!(
        ReconciledStatistics::reconcile(reported(1, &[("ARCHIVED", 1)]), &rows),
        Err(StatisticsMismatch::UnknownStatus("ARCHIVED".to_string()))
    );
}

#[test]
fn unrecognized_rows_stay_listed_without_transitions() {
    let mut odd = application(2, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending);
    odd.status = RecordedStatus::from_wire("IN_REVIEW");
    let board = ApplicationBoard::new(
        employer(),
        vec![
            application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending),
            odd.clone(),
        ],
    );

    assert_eq!(board.filtered(StatusFilter::All).len(), 2);
    assert!(board
        .filtered(StatusFilter::Only(ApplicationStatus::Pending))
        .iter()
        .all(|a| a.id == ApplicationId(1)));
    assert_eq!(board.actions_for(&odd), vec![ApplicationAction::View]);
    assert_eq!(
        ApplicationPolicy::authorize(&employer(), &odd, ApplicationAction::Reject),
        Err(PolicyDenial::UnrecognizedStatus)
    );
    assert_eq!(odd.status.label(Locale::En), "IN_REVIEW");

    let counts = board.counts();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.unrecognized, 1);
}

#[test]
fn reported_counts_that_overflow_are_refused_or_clamped() {
    let huge = reported(0, &[("PENDING", u64::MAX), ("NEW", 1)]);
    assert_eq!(
        StatusCounts::from_reported(&huge),
        Err(StatisticsMismatch::CountOverflow("PENDING".to_string()))
    );

    let lossy = StatusCounts::from_reported_lossy(&huge);
    assert_eq!(lossy.pending, u64::MAX);
    assert_eq!(lossy.total, u64::MAX);

    let rows = vec![application(1, CANDIDATE, Some(EMPLOYER), ApplicationStatus::Pending)];
    assert!(matches!(
        ReconciledStatistics::reconcile(huge, &rows),
        Err(StatisticsMismatch::CountOverflow(_))
    ));
}

#[test]
fn lossy_statistics_count_unknown_literals_separately() {
    let counts = StatusCounts::from_reported_lossy(&reported(3, &[("ARCHIVED", 2), ("NEW", 1)]));
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.unrecognized, 2);
    assert_eq!(counts.total, 3);
}

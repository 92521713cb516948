use serde::Serialize;
use tracing::warn;

use super::status::{ApplicationStatus, Locale};
use crate::domain::{Application, ApplicationStatistics};

/// Per-status tallies for one account's applications. Statuses outside the
/// table are counted in `unrecognized` and in `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub withdrawn: u64,
    pub unrecognized: u64,
}

impl StatusCounts {
    pub fn from_applications<'a, I>(applications: I) -> Self
    where
        I: IntoIterator<Item = &'a Application>,
    {
        applications
            .into_iter()
            .fold(Self::default(), |mut counts, application| {
                counts.saturating_add(application.status.known(), 1);
                counts
            })
    }

    /// Decodes the backend's literal-keyed map. Several literals may name the
    /// same status (`NEW` and `PENDING`); their counts are summed.
    pub fn from_reported(reported: &ApplicationStatistics) -> Result<Self, StatisticsMismatch> {
        let mut counts = Self::default();
        for (literal, count) in &reported.applications_by_status {
            let status = ApplicationStatus::from_wire(literal)
                .ok_or_else(|| StatisticsMismatch::UnknownStatus(literal.clone()))?;
            counts
                .checked_add(Some(status), *count)
                .ok_or_else(|| StatisticsMismatch::CountOverflow(literal.clone()))?;
        }
        Ok(counts)
    }

    /// Like [`StatusCounts::from_reported`] but never fails, for summary
    /// widgets that must render regardless. Unknown literals land in
    /// `unrecognized` and counts saturate.
    pub fn from_reported_lossy(reported: &ApplicationStatistics) -> Self {
        let mut counts = Self::default();
        for (literal, count) in &reported.applications_by_status {
            let status = ApplicationStatus::from_wire(literal);
            if status.is_none() {
                warn!(literal = %literal, count, "unknown status in statistics");
            }
            counts.saturating_add(status, *count);
        }
        counts
    }

    /// Leaves the counts untouched and returns `None` on overflow.
    fn checked_add(&mut self, status: Option<ApplicationStatus>, count: u64) -> Option<()> {
        let total = self.total.checked_add(count)?;
        let slot = self.slot_mut(status);
        *slot = slot.checked_add(count)?;
        self.total = total;
        Some(())
    }

    fn saturating_add(&mut self, status: Option<ApplicationStatus>, count: u64) {
        self.total = self.total.saturating_add(count);
        let slot = self.slot_mut(status);
        *slot = slot.saturating_add(count);
    }

    fn slot_mut(&mut self, status: Option<ApplicationStatus>) -> &mut u64 {
        match status {
            Some(ApplicationStatus::Pending) => &mut self.pending,
            Some(ApplicationStatus::Accepted) => &mut self.accepted,
            Some(ApplicationStatus::Rejected) => &mut self.rejected,
            Some(ApplicationStatus::Withdrawn) => &mut self.withdrawn,
            None => &mut self.unrecognized,
        }
    }

    pub fn get(&self, status: ApplicationStatus) -> u64 {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Accepted => self.accepted,
            ApplicationStatus::Rejected => self.rejected,
            ApplicationStatus::Withdrawn => self.withdrawn,
        }
    }

    /// `(label, count)` rows in table order, for rendering.
    pub fn labelled(&self, locale: Locale) -> Vec<(&'static str, u64)> {
        ApplicationStatus::ALL
            .iter()
            .map(|status| (status.label(locale), self.get(*status)))
            .collect()
    }
}

/// Backend statistics that agree with the scoped application list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledStatistics {
    pub counts: StatusCounts,
    pub reported: ApplicationStatistics,
}

impl ReconciledStatistics {
    /// Checks `reported` against the tallies of `applications`: the reported total
    /// must equal the sum of its per-status counts and every count must match.
    pub fn reconcile(
        reported: ApplicationStatistics,
        applications: &[Application],
    ) -> Result<Self, StatisticsMismatch> {
        let from_backend = StatusCounts::from_reported(&reported)?;
        if from_backend.total != reported.total_applications {
            return Err(StatisticsMismatch::TotalDiffers {
                reported: reported.total_applications,
                summed: from_backend.total,
            });
        }

        let listed = StatusCounts::from_applications(applications);
        for status in ApplicationStatus::ALL {
            if from_backend.get(status) != listed.get(status) {
                return Err(StatisticsMismatch::CountDiffers {
                    status,
                    reported: from_backend.get(status),
                    listed: listed.get(status),
                });
            }
        }

        Ok(Self {
            counts: listed,
            reported,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatisticsMismatch {
    #[error("statistics report unknown status '{0}'")]
    UnknownStatus(String),
    #[error("statistics count for '{0}' overflows")]
    CountOverflow(String),
    #[error("reported total {reported} differs from the per-status sum {summed}")]
    TotalDiffers { reported: u64, summed: u64 },
    #[error("{status} count differs: backend reports {reported}, list holds {listed}")]
    CountDiffers {
        status: ApplicationStatus,
        reported: u64,
        listed: u64,
    },
}

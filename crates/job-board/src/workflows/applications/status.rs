use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle of an application. `Pending` is the only state with outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

/// Which literal set the backend expects when a status travels in a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusVocabulary {
    /// `PENDING`, `ACCEPTED`, `REJECTED`, `WITHDRAWN`.
    #[default]
    Canonical,
    /// `NEW` for the initial state, the rest as canonical.
    Legacy,
}

impl StatusVocabulary {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "canonical" | "english" => Some(Self::Canonical),
            "legacy" | "new" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// Display language for status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Unknown locales fall back to English.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ru" | "ru-ru" | "ru_ru" => Locale::Ru,
            _ => Locale::En,
        }
    }
}

struct StatusEntry {
    status: ApplicationStatus,
    canonical: &'static str,
    legacy: &'static str,
    aliases: &'static [&'static str],
    label_en: &'static str,
    label_ru: &'static str,
}

const STATUS_TABLE: [StatusEntry; 4] = [
    StatusEntry {
        status: ApplicationStatus::Pending,
        canonical: "PENDING",
        legacy: "NEW",
        aliases: &["PENDING", "NEW", "Новый", "Ожидает"],
        label_en: "Pending",
        label_ru: "Ожидает",
    },
    StatusEntry {
        status: ApplicationStatus::Accepted,
        canonical: "ACCEPTED",
        legacy: "ACCEPTED",
        aliases: &["ACCEPTED", "Принято", "Принят"],
        label_en: "Accepted",
        label_ru: "Принято",
    },
    StatusEntry {
        status: ApplicationStatus::Rejected,
        canonical: "REJECTED",
        legacy: "REJECTED",
        aliases: &["REJECTED", "Отказ", "Отклонено"],
        label_en: "Rejected",
        label_ru: "Отклонено",
    },
    StatusEntry {
        status: ApplicationStatus::Withdrawn,
        canonical: "WITHDRAWN",
        legacy: "WITHDRAWN",
        aliases: &["WITHDRAWN", "Отозван", "Отозвано"],
        label_en: "Withdrawn",
        label_ru: "Отозвано",
    },
];

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    fn entry(self) -> &'static StatusEntry {
        // Table order matches declaration order.
        &STATUS_TABLE[self as usize]
    }

    /// Decodes any observed literal: English, legacy `NEW`, or the Russian labels.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        STATUS_TABLE
            .iter()
            .find(|entry| {
                entry
                    .aliases
                    .iter()
                    .any(|alias| alias.to_lowercase() == needle)
            })
            .map(|entry| entry.status)
    }

    pub fn as_wire(self, vocabulary: StatusVocabulary) -> &'static str {
        match vocabulary {
            StatusVocabulary::Canonical => self.entry().canonical,
            StatusVocabulary::Legacy => self.entry().legacy,
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.entry().label_en,
            Locale::Ru => self.entry().label_ru,
        }
    }

    pub const fn is_initial(self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }

    pub const fn is_terminal(self) -> bool {
        !self.is_initial()
    }

    /// Only `Pending -> Rejected` and `Pending -> Withdrawn` exist.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Rejected)
                | (ApplicationStatus::Pending, ApplicationStatus::Withdrawn)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry().canonical)
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.entry().canonical)
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ApplicationStatus::from_wire(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown application status '{raw}'"))
        })
    }
}

/// Status as recorded on an application row. Literals outside the table are
/// kept verbatim so one odd row does not fail the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordedStatus {
    Known(ApplicationStatus),
    Unrecognized(String),
}

impl RecordedStatus {
    pub fn from_wire(raw: &str) -> Self {
        match ApplicationStatus::from_wire(raw) {
            Some(status) => RecordedStatus::Known(status),
            None => RecordedStatus::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn known(&self) -> Option<ApplicationStatus> {
        match self {
            RecordedStatus::Known(status) => Some(*status),
            RecordedStatus::Unrecognized(_) => None,
        }
    }

    pub fn is_initial(&self) -> bool {
        self.known().is_some_and(ApplicationStatus::is_initial)
    }

    /// An unrecognized status has no transitions.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        self.known()
            .is_some_and(|status| status.can_transition_to(next))
    }

    /// Table label, or the raw literal when the status is not in the table.
    pub fn label(&self, locale: Locale) -> &str {
        match self {
            RecordedStatus::Known(status) => status.label(locale),
            RecordedStatus::Unrecognized(raw) => raw.as_str(),
        }
    }
}

impl From<ApplicationStatus> for RecordedStatus {
    fn from(status: ApplicationStatus) -> Self {
        RecordedStatus::Known(status)
    }
}

impl PartialEq<ApplicationStatus> for RecordedStatus {
    fn eq(&self, other: &ApplicationStatus) -> bool {
        self.known() == Some(*other)
    }
}

impl fmt::Display for RecordedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedStatus::Known(status) => fmt::Display::fmt(status, f),
            RecordedStatus::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordedStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RecordedStatus::Known(status) => status.serialize(serializer),
            RecordedStatus::Unrecognized(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RecordedStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordedStatus::from_wire(&raw))
    }
}

/// Status filter offered on the application list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        ApplicationStatus::from_wire(trimmed).map(StatusFilter::Only)
    }

    pub fn matches(self, status: &RecordedStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => *status == expected,
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (StatusFilter::All, Locale::En) => "All",
            (StatusFilter::All, Locale::Ru) => "Все",
            (StatusFilter::Only(status), locale) => status.label(locale),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StatusFilter::All => serializer.serialize_str("ALL"),
            StatusFilter::Only(status) => status.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_observed_vocabulary_decodes() {
        for raw in ["PENDING", "NEW", " new ", "Новый", "pending\n"] {
            assert_eq!(
                ApplicationStatus::from_wire(raw),
                Some(ApplicationStatus::Pending),
                "{raw:?}"
            );
        }
        assert_eq!(
            ApplicationStatus::from_wire("Отказ"),
            Some(ApplicationStatus::Rejected)
        );
        assert_eq!(
            ApplicationStatus::from_wire("отозван"),
            Some(ApplicationStatus::Withdrawn)
        );
        assert_eq!(
            ApplicationStatus::from_wire("accepted"),
            Some(ApplicationStatus::Accepted)
        );
        assert_eq!(ApplicationStatus::from_wire("ARCHIVED"), None);
        assert_eq!(ApplicationStatus::from_wire("   "), None);
    }

    #[test]
    fn table_rows_line_up_with_variants() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.entry().status, status);
            assert_eq!(
                ApplicationStatus::from_wire(status.as_wire(StatusVocabulary::Legacy)),
                Some(status)
            );
        }
    }

    #[test]
    fn vocabulary_only_changes_the_initial_literal() {
        assert_eq!(
            ApplicationStatus::Pending.as_wire(StatusVocabulary::Canonical),
            "PENDING"
        );
        assert_eq!(ApplicationStatus::Pending.as_wire(StatusVocabulary::Legacy), "NEW");
        assert_eq!(
            ApplicationStatus::Rejected.as_wire(StatusVocabulary::Legacy),
            "REJECTED"
        );
    }

    #[test]
    fn only_pending_has_outgoing_transitions() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Withdrawn));
        assert!(!Pending.can_transition_to(Accepted));
        assert!(!Rejected.can_transition_to(Withdrawn));
        assert!(!Withdrawn.can_transition_to(Rejected));
        assert!(Accepted.is_terminal());
    }

    #[test]
    fn labels_follow_locale() {
        assert_eq!(ApplicationStatus::Withdrawn.label(Locale::En), "Withdrawn");
        assert_eq!(ApplicationStatus::Withdrawn.label(Locale::Ru), "Отозвано");
        assert_eq!(StatusFilter::All.label(Locale::Ru), "Все");
    }

    #[test]
    fn serde_uses_canonical_literals() {
        let status: ApplicationStatus = serde_json::from_str("\"Новый\"").expect("decodes");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"PENDING\"");
        assert!(serde_json::from_str::<ApplicationStatus>("\"LOST\"").is_err());
    }

    #[test]
    fn filter_parses_query_values() {
        assert_eq!(StatusFilter::parse("ALL"), Some(StatusFilter::All));
        assert_eq!(StatusFilter::parse(""), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("new"),
            Some(StatusFilter::Only(ApplicationStatus::Pending))
        );
        assert_eq!(StatusFilter::parse("bogus"), None);
        let rejected = RecordedStatus::from(ApplicationStatus::Rejected);
        let odd = RecordedStatus::from_wire("IN_REVIEW");
        assert!(StatusFilter::Only(ApplicationStatus::Rejected).matches(&rejected));
        assert!(!StatusFilter::Only(ApplicationStatus::Pending).matches(&rejected));
        assert!(!StatusFilter::Only(ApplicationStatus::Pending).matches(&odd));
        assert!(StatusFilter::All.matches(&odd));
    }

    #[test]
    fn unrecognized_literal_is_kept_verbatim() {
        let status: RecordedStatus = serde_json::from_str("\" IN_REVIEW \"").expect("decodes");
        assert_eq!(status, RecordedStatus::Unrecognized("IN_REVIEW".to_string()));
        assert_eq!(status.label(Locale::Ru), "IN_REVIEW");
        assert_eq!(status.known(), None);
        assert!(!status.is_initial());
        assert!(!status.can_transition_to(ApplicationStatus::Withdrawn));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"IN_REVIEW\"");

        let known: RecordedStatus = serde_json::from_str("\"NEW\"").expect("decodes");
        assert_eq!(known, ApplicationStatus::Pending);
        assert!(known.can_transition_to(ApplicationStatus::Withdrawn));
    }
}

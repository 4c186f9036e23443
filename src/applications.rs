use tracing::warn;

use crate::api::JobBoardApi;
use crate::demo;
use crate::error::ApiError;
use crate::models::{Application, ApplicationStatus};

/// Tabs on the applications page. `None` is "all".
pub const TABS: [(Option<ApplicationStatus>, &str); 5] = [
    (None, "All Applications"),
    (Some(ApplicationStatus::Applied), "Applied"),
    (Some(ApplicationStatus::UnderReview), "Under Review"),
    (Some(ApplicationStatus::Shortlisted), "Shortlisted"),
    (Some(ApplicationStatus::Rejected), "Rejected"),
];

pub fn fetch(api: &dyn JobBoardApi, demo_fallback: bool) -> Result<Vec<Application>, ApiError> {
    match api.my_applications() {
        Ok(applications) => Ok(applications),
        Err(e) if demo_fallback => {
            warn!(error = %e, "applications fetch failed; showing demo applications");
            Ok(demo::applications())
        }
        Err(e) => Err(e),
    }
}

pub fn filter(applications: &[Application], tab: Option<ApplicationStatus>) -> Vec<&Application> {
    applications
        .iter()
        .filter(|app| tab.is_none_or(|status| app.status == status))
        .collect()
}

pub fn count(applications: &[Application], tab: Option<ApplicationStatus>) -> usize {
    filter(applications, tab).len()
}

pub fn tab_labels(applications: &[Application]) -> Vec<String> {
    TABS.iter()
        .map(|(tab, label)| format!("{} ({})", label, count(applications, *tab)))
        .collect()
}

pub fn empty_message(tab: Option<ApplicationStatus>) -> String {
    match tab {
        None => "No applications yet".to_string(),
        Some(status) => format!("No {} applications", status),
    }
}

/// Progress through review, shortlist and hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub reviewed: bool,
    pub shortlisted: bool,
    pub hired: bool,
}

pub fn timeline(status: ApplicationStatus) -> Timeline {
    use ApplicationStatus::*;
    Timeline {
        reviewed: matches!(status, UnderReview | Shortlisted | Hired),
        shortlisted: matches!(status, Shortlisted | Hired),
        hired: status == Hired,
    }
}

impl Timeline {
    pub fn render(&self) -> String {
        let mark = |done: bool| if done { "[x]" } else { "[ ]" };
        format!(
            "{} Applied -> {} Under Review -> {} Shortlisted -> {} Hired",
            mark(true),
            mark(self.reviewed),
            mark(self.shortlisted),
            mark(self.hired)
        )
    }
}

/// Candidate-facing follow-up for an application, if any.
pub fn next_step(status: ApplicationStatus) -> Option<&'static str> {
    match status {
        ApplicationStatus::Shortlisted => Some("Schedule Interview"),
        _ => None,
    }
}

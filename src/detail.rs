use tracing::{debug, info, warn};

use crate::api::JobBoardApi;
use crate::demo;
use crate::error::ApiError;
use crate::models::{ApplicationRequest, JobListing};
use crate::session::Session;

pub const DEFAULT_COVER_LETTER: &str = "Applied through CareerConnect platform";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    NotApplied,
    Applying,
    /// Terminal. Later status changes belong to the server.
    Applied,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    NotFound,
    Found { job: JobListing, apply: ApplyState },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No session: send the visitor to log in. Nothing was sent.
    RedirectToLogin,
    /// Refused locally. Nothing was sent.
    Rejected(String),
    Submitted,
    AlreadyApplied,
    /// The request failed; state is back to `NotApplied` and the user may retry.
    Failed(String),
}

fn found(job: JobListing) -> DetailState {
    let apply = if job.has_applied {
        ApplyState::Applied
    } else {
        ApplyState::NotApplied
    };
    DetailState::Found { job, apply }
}

/// One listing's detail view and its application state machine.
pub struct DetailFlow {
    id: String,
    state: DetailState,
    cover_letter: String,
}

impl DetailFlow {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            state: DetailState::Loading,
            cover_letter: DEFAULT_COVER_LETTER.to_string(),
        }
    }

    /// Starts the flow from a listing already in hand (e.g. a search result).
    pub fn from_listing(job: JobListing) -> Self {
        Self {
            id: job.id.clone(),
            state: found(job),
            cover_letter: DEFAULT_COVER_LETTER.to_string(),
        }
    }

    pub fn with_cover_letter(mut self, cover_letter: &str) -> Self {
        self.cover_letter = cover_letter.to_string();
        self
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn apply_state(&self) -> Option<ApplyState> {
        match &self.state {
            DetailState::Found { apply, .. } => Some(*apply),
            _ => None,
        }
    }

    pub fn load(&mut self, api: &dyn JobBoardApi, demo_fallback: bool) -> Result<&DetailState, ApiError> {
        self.state = DetailState::Loading;
        match api.get_job(&self.id) {
            Ok(job) => {
                self.state = found(job);
            }
            Err(e) if e.is_not_found() => {
                self.state = DetailState::NotFound;
            }
            Err(e) if demo_fallback => {
                warn!(error = %e, id = %self.id, "job fetch failed; showing demo listing");
                self.state = DetailState::Found {
                    job: demo::listing_detail(&self.id),
                    apply: ApplyState::NotApplied,
                };
            }
            Err(e) => {
                self.state = DetailState::NotFound;
                return Err(e);
            }
        }
        Ok(&self.state)
    }

    pub fn apply(&mut self, session: Option<&Session>, api: &dyn JobBoardApi) -> ApplyOutcome {
        let Some(session) = session else {
            return ApplyOutcome::RedirectToLogin;
        };
        if !session.is_candidate() {
            return ApplyOutcome::Rejected("Only candidates can apply for jobs".to_string());
        }

        let DetailState::Found { apply, .. } = &mut self.state else {
            return ApplyOutcome::Rejected("Job is not available".to_string());
        };
        match *apply {
            ApplyState::Applied => return ApplyOutcome::AlreadyApplied,
            ApplyState::Applying => return ApplyOutcome::Rejected("Application already in progress".to_string()),
            ApplyState::NotApplied => *apply = ApplyState::Applying,
        }
        debug!(id = %self.id, "applying");

        let request = ApplicationRequest {
            cover_letter: self.cover_letter.clone(),
        };
        let result = api.apply_to_job(&self.id, &request);

        if let DetailState::Found { apply, .. } = &mut self.state {
            match result {
                Ok(()) => {
                    *apply = ApplyState::Applied;
                    info!(id = %self.id, "application submitted");
                    ApplyOutcome::Submitted
                }
                Err(e) => {
                    *apply = ApplyState::NotApplied;
                    warn!(id = %self.id, error = %e, "application failed");
                    ApplyOutcome::Failed(format!("Failed to submit application. Please try again. ({})", e))
                }
            }
        } else {
            ApplyOutcome::Failed("Job is no longer available".to_string())
        }
    }
}

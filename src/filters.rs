use std::collections::BTreeSet;

use crate::models::{ExperienceLevel, JobType};

/// Current search criteria.
///
/// `skills` and `job_types` are always present; "no constraint" is an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub keyword: String,
    pub location: String,
    pub skills: BTreeSet<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_types: BTreeSet<JobType>,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
}

/// A partial update. `Some` overrides the corresponding key, `None` leaves it alone.
/// For the optional facets the inner `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFilterState {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub skills: Option<BTreeSet<String>>,
    pub experience_level: Option<Option<ExperienceLevel>>,
    pub job_types: Option<BTreeSet<JobType>>,
    pub salary_min: Option<Option<u32>>,
    pub salary_max: Option<Option<u32>>,
}

impl FilterState {
    pub fn with_terms(keyword: &str, location: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    /// Number of criteria currently narrowing the search.
    pub fn active_filter_count(&self) -> usize {
        [
            !self.keyword.is_empty(),
            !self.location.is_empty(),
            !self.skills.is_empty(),
            self.experience_level.is_some(),
            !self.job_types.is_empty(),
            self.salary_min.is_some(),
            self.salary_max.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// Owns the filter state for one search view.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn apply(&mut self, partial: PartialFilterState) -> &FilterState {
        let s = &mut self.state;
        if let Some(keyword) = partial.keyword {
            s.keyword = keyword;
        }
        if let Some(location) = partial.location {
            s.location = location;
        }
        if let Some(skills) = partial.skills {
            s.skills = skills;
        }
        if let Some(level) = partial.experience_level {
            s.experience_level = level;
        }
        if let Some(types) = partial.job_types {
            s.job_types = types;
        }
        if let Some(min) = partial.salary_min {
            s.salary_min = min;
        }
        if let Some(max) = partial.salary_max {
            s.salary_max = max;
        }
        tracing::debug!(filters = ?self.state, "filters updated");
        &self.state
    }

    /// Resets every facet. Keyword and location are search terms, not filters,
    /// and are kept verbatim.
    pub fn clear(&mut self) -> &FilterState {
        self.state = FilterState::with_terms(&self.state.keyword, &self.state.location);
        tracing::debug!("facet filters cleared");
        &self.state
    }

    pub fn toggle_skill(&mut self, skill: &str) -> &FilterState {
        toggle(&mut self.state.skills, skill.to_string());
        &self.state
    }

    pub fn toggle_job_type(&mut self, job_type: JobType) -> &FilterState {
        toggle(&mut self.state.job_types, job_type);
        &self.state
    }
}

/// Symmetric difference of `set` with `{value}`.
pub fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

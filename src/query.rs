use std::collections::BTreeMap;

use crate::filters::FilterState;

/// Flattens filter state into `GET /jobs` query parameters.
///
/// Set-valued facets are joined with commas. A key whose value would be empty
/// is left out: an absent parameter means "no constraint on this facet".
/// Salary bounds are emitted whenever set, including `0`.
pub fn build(filters: &FilterState) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    insert_non_empty(&mut params, "keyword", filters.keyword.trim().to_string());
    insert_non_empty(&mut params, "location", filters.location.trim().to_string());
    insert_non_empty(&mut params, "skills", join(filters.skills.iter().map(String::as_str)));
    insert_non_empty(&mut params, "jobType", join(filters.job_types.iter().map(|t| t.as_str())));

    if let Some(level) = filters.experience_level {
        params.insert("experienceLevel".to_string(), level.as_str().to_string());
    }
    if let Some(min) = filters.salary_min {
        params.insert("salaryMin".to_string(), min.to_string());
    }
    if let Some(max) = filters.salary_max {
        params.insert("salaryMax".to_string(), max.to_string());
    }

    params
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn insert_non_empty(params: &mut BTreeMap<String, String>, key: &str, value: String) {
    if !value.is_empty() {
        params.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterStore, PartialFilterState};
    use crate::models::{ExperienceLevel, JobType};

    #[test]
    fn test_empty_state_builds_no_params() {
        assert!(build(&FilterState::default()).is_empty());
    }

    #[test]
    fn test_full_state() {
        let mut store = FilterStore::new(FilterState::with_terms("frontend", "San Francisco, CA"));
        store.toggle_skill("React");
        store.toggle_skill("CSS");
        store.toggle_job_type(JobType::FullTime);
        store.toggle_job_type(JobType::Remote);
        store.apply(PartialFilterState {
            experience_level: Some(Some(ExperienceLevel::Mid)),
            salary_min: Some(Some(100)),
            salary_max: Some(Some(140)),
            ..Default::default()
        });

        let params = build(store.state());
        assert_eq!(params["keyword"], "frontend");
        assert_eq!(params["location"], "San Francisco, CA");
        assert_eq!(params["skills"], "CSS,React");
        assert_eq!(params["jobType"], "Full-time,Remote");
        assert_eq!(params["experienceLevel"], "Mid");
        assert_eq!(params["salaryMin"], "100");
        assert_eq!(params["salaryMax"], "140");
    }

    #[test]
    fn test_never_emits_empty_values() {
        let mut state = FilterState::with_terms("   ", "");
        state.skills.insert(" ".to_string());
        let params = build(&state);
        assert!(params.values().all(|v| !v.is_empty()));
        assert!(params.is_empty());
    }

    #[test]
    fn test_zero_salary_bound_is_kept() {
        let state = FilterState {
            salary_min: Some(0),
            ..Default::default()
        };
        let params = build(&state);
        assert_eq!(params.get("salaryMin").map(String::as_str), Some("0"));
        assert!(!params.contains_key("salaryMax"));
    }
}

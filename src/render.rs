use chrono::{DateTime, Utc};

use crate::models::JobListing;
use crate::search::RequestStatus;

pub const SKELETON_COUNT: usize = 3;
const EXCERPT_CHARS: usize = 150;
const CARD_SKILLS: usize = 4;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingView {
    Loading { skeletons: usize },
    /// No results; offers the clear-filters action.
    Empty,
    Populated(Vec<JobCard>),
}

/// Summary of one listing as shown in a result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted: String,
    pub excerpt: String,
    pub skills: Vec<String>,
    pub more_skills: usize,
    pub job_type: String,
    pub experience: String,
}

pub fn view_state(status: &RequestStatus, listings: &[JobListing]) -> ListingView {
    if *status == RequestStatus::Loading {
        return ListingView::Loading {
            skeletons: SKELETON_COUNT,
        };
    }
    if listings.is_empty() {
        return ListingView::Empty;
    }
    let now = Utc::now();
    ListingView::Populated(listings.iter().map(|job| card(job, now)).collect())
}

pub fn heading(status: &RequestStatus, count: usize) -> String {
    match status {
        RequestStatus::Loading => "Searching...".to_string(),
        _ => format!("{} Jobs Found", count),
    }
}

pub fn card(job: &JobListing, now: DateTime<Utc>) -> JobCard {
    let company = if job.company.name.is_empty() {
        "Company Name".to_string()
    } else {
        job.company.name.clone()
    };
    JobCard {
        id: job.id.clone(),
        title: job.title.clone(),
        company,
        location: job.location.clone(),
        salary: format_salary(job.salary_min, job.salary_max),
        posted: job
            .posted_at
            .map(|t| format_relative(t, now))
            .unwrap_or_default(),
        excerpt: excerpt(&job.description),
        skills: job.skills.iter().take(CARD_SKILLS).cloned().collect(),
        more_skills: job.skills.len().saturating_sub(CARD_SKILLS),
        job_type: job
            .job_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Full-time".to_string()),
        experience: job
            .experience_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "Mid-level".to_string()),
    }
}

/// Salary bounds are in thousands.
pub fn format_salary(min: Option<u32>, max: Option<u32>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("${}k - ${}k", min, max),
        (Some(min), None) => format!("${}k+", min),
        (None, Some(max)) => format!("Up to ${}k", max),
        (None, None) => "Salary not disclosed".to_string(),
    }
}

/// Whole days are rounded up: anything within the last 24h counts as one day.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let ms = (now - then).num_milliseconds().abs();
    let days = (ms + DAY_MS - 1) / DAY_MS;

    if days == 1 {
        "1 day ago".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else if days < 30 {
        format!("{} weeks ago", ceil_div(days, 7))
    } else {
        format!("{} months ago", ceil_div(days, 30))
    }
}

fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}

fn excerpt(description: &str) -> String {
    let head: String = description.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head)
}

pub fn card_lines(card: &JobCard) -> Vec<String> {
    let mut lines = vec![
        format!("#{}  {}", card.id, card.title),
        format!("    {} | {}", card.company, card.location),
        format!("    {} | {}", card.salary, card.posted),
        format!("    {}", card.excerpt),
    ];
    let mut tags = card.skills.join(", ");
    if card.more_skills > 0 {
        tags.push_str(&format!(" +{} more", card.more_skills));
    }
    if !tags.is_empty() {
        lines.push(format!("    [{}]", tags));
    }
    lines.push(format!("    {} | {}", card.job_type, card.experience));
    lines
}

pub fn view_lines(view: &ListingView) -> Vec<String> {
    match view {
        ListingView::Loading { skeletons } => (0..*skeletons).map(|_| "  ......".to_string()).collect(),
        ListingView::Empty => vec![
            "No jobs found".to_string(),
            "Try adjusting your search criteria or filters (--clear to reset filters)".to_string(),
        ],
        ListingView::Populated(cards) => {
            let mut lines = Vec::new();
            for card in cards {
                lines.extend(card_lines(card));
                lines.push(String::new());
            }
            lines
        }
    }
}

/// Full listing text for the detail view.
pub fn detail_lines(job: &JobListing, width: usize) -> Vec<String> {
    let mut lines = vec![job.title.clone()];
    if !job.company.name.is_empty() {
        lines.push(format!("at {}", job.company.name));
    }
    lines.push(format!(
        "{} | {} | {}",
        job.location,
        job.job_type.map(|t| t.to_string()).unwrap_or_default(),
        job.experience_level.map(|l| l.to_string()).unwrap_or_default()
    ));
    lines.push(format_salary(job.salary_min, job.salary_max));
    if let Some(posted) = job.posted_at {
        lines.push(format!("Posted {}", posted.format("%Y-%m-%d")));
    }
    lines.push(String::new());

    lines.push("Job Description".to_string());
    for paragraph in job.description.lines() {
        for line in textwrap::wrap(paragraph, width) {
            lines.push(line.into_owned());
        }
    }

    if !job.skills.is_empty() {
        lines.push(String::new());
        lines.push("Required Skills".to_string());
        lines.push(format!("  {}", job.skills.join(", ")));
    }

    let company = &job.company;
    let about: Vec<(&str, &Option<String>)> = vec![
        ("Industry", &company.industry),
        ("Company Size", &company.size),
        ("Location", &company.location),
    ];
    if about.iter().any(|(_, v)| v.is_some()) {
        lines.push(String::new());
        lines.push(format!("About {}", company.name));
        for (label, value) in about {
            if let Some(value) = value {
                lines.push(format!("  {}: {}", label, value));
            }
        }
    }

    if !job.benefits.is_empty() {
        lines.push(String::new());
        lines.push("Benefits & Perks".to_string());
        for benefit in &job.benefits {
            lines.push(format!("  + {}", benefit));
        }
    }

    if let Some(deadline) = job.application_deadline {
        lines.push(String::new());
        lines.push(format!("Application Deadline: {}", deadline.format("%A, %B %-d, %Y")));
    }

    lines
}

//! Placeholder dataset for demos. Only used when `CAREERCONNECT_DEMO_DATA` is on.

use chrono::{Duration, Utc};

use crate::models::{Application, ApplicationStatus, Company, ExperienceLevel, JobListing, JobType};

fn company(name: &str) -> Company {
    Company {
        name: name.to_string(),
        ..Default::default()
    }
}

fn skills(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn summary(
    id: &str,
    title: &str,
    company_name: &str,
    location: &str,
    description: &str,
    tags: &[&str],
    level: ExperienceLevel,
    pay: (u32, u32),
    days_old: i64,
) -> JobListing {
    JobListing {
        id: id.to_string(),
        title: title.to_string(),
        company: company(company_name),
        location: location.to_string(),
        description: description.to_string(),
        skills: skills(tags),
        salary_min: Some(pay.0),
        salary_max: Some(pay.1),
        posted_at: Some(Utc::now() - Duration::days(days_old)),
        job_type: Some(JobType::FullTime),
        experience_level: Some(level),
        benefits: Vec::new(),
        application_deadline: None,
        has_applied: false,
    }
}

pub fn listings() -> Vec<JobListing> {
    vec![
        summary(
            "1",
            "Senior Frontend Developer",
            "TechCorp Inc.",
            "San Francisco, CA",
            "We are looking for a skilled Frontend Developer to join our team and help build amazing user experiences.",
            &["React", "JavaScript", "TypeScript", "CSS", "HTML"],
            ExperienceLevel::Senior,
            (120, 160),
            2,
        ),
        summary(
            "2",
            "Backend Engineer",
            "StartupXYZ",
            "Remote",
            "Join our backend team to build scalable APIs and microservices that power our platform.",
            &["Node.js", "Python", "AWS", "MongoDB", "Docker"],
            ExperienceLevel::Mid,
            (90, 130),
            5,
        ),
        summary(
            "3",
            "Full Stack Developer",
            "Digital Agency",
            "New York, NY",
            "Looking for a versatile developer who can work on both frontend and backend technologies.",
            &["React", "Node.js", "PostgreSQL", "AWS", "Git"],
            ExperienceLevel::Mid,
            (100, 140),
            7,
        ),
    ]
}

/// A fully populated listing carrying the requested id.
pub fn listing_detail(id: &str) -> JobListing {
    let now = Utc::now();
    JobListing {
        id: id.to_string(),
        title: "Senior Frontend Developer".to_string(),
        company: Company {
            name: "TechCorp Inc.".to_string(),
            logo: Some("https://via.placeholder.com/80x80".to_string()),
            location: Some("San Francisco, CA".to_string()),
            size: Some("500-1000 employees".to_string()),
            industry: Some("Technology".to_string()),
        },
        location: "San Francisco, CA".to_string(),
        description: "We are looking for a skilled Senior Frontend Developer to join our growing team. \
You will be responsible for building and maintaining user-facing web applications using modern JavaScript frameworks.\n\n\
Key Responsibilities:\n\
- Develop responsive web applications using React and TypeScript\n\
- Collaborate with designers and backend developers\n\
- Optimize applications for maximum speed and scalability\n\n\
Requirements:\n\
- 5+ years of experience in frontend development\n\
- Strong proficiency in React, JavaScript, and TypeScript"
            .to_string(),
        skills: skills(&["React", "JavaScript", "TypeScript", "CSS", "HTML", "Redux", "Git"]),
        salary_min: Some(120),
        salary_max: Some(160),
        posted_at: Some(now - Duration::days(3)),
        job_type: Some(JobType::FullTime),
        experience_level: Some(ExperienceLevel::Senior),
        benefits: skills(&[
            "Competitive salary and equity package",
            "Health, dental, and vision insurance",
            "Flexible work arrangements",
            "Professional development budget",
        ]),
        application_deadline: Some(now + Duration::days(30)),
        has_applied: false,
    }
}

pub fn applications() -> Vec<Application> {
    let now = Utc::now();
    let jobs = listings();
    let plan = [
        (ApplicationStatus::UnderReview, 5, 2),
        (ApplicationStatus::Shortlisted, 10, 1),
        (ApplicationStatus::Rejected, 15, 7),
    ];
    jobs.into_iter()
        .zip(plan)
        .map(|(job, (status, applied, updated))| Application {
            id: job.id.clone(),
            job,
            status,
            applied_at: now - Duration::days(applied),
            last_updated: Some(now - Duration::days(updated)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_shape() {
        assert_eq!(listings().len(), 3);
        assert_eq!(listing_detail("abc").id, "abc");
        let apps = applications();
        assert_eq!(apps.len(), 3);
        assert_eq!(apps[1].status, ApplicationStatus::Shortlisted);
    }
}

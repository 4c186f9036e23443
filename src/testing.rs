//! In-process stand-in for the backend, recording every call it receives.

use chrono::{Duration, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::api::JobBoardApi;
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationRequest, ApplicationStatus, Company, Credentials, JobListing, ParsedResume,
    Profile, Registration, ResumeUploadResponse, Role, User,
};
use crate::resume::ResumeFile;

#[derive(Default)]
pub struct FakeApi {
    calls: RefCell<Vec<String>>,
    pub jobs: Vec<JobListing>,
    pub applications: Vec<Application>,
    pub user: Option<User>,
    pub parsed_skills: Vec<String>,
    pub fail_status: Option<u16>,
}

impl FakeApi {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_jobs(jobs: Vec<JobListing>) -> Self {
        Self {
            jobs,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        match self.fail_status {
            Some(401) => Err(ApiError::Unauthorized),
            Some(status) => Err(ApiError::Server {
                status,
                body: "fake failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl JobBoardApi for FakeApi {
    fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.record(format!("POST /auth/login {}", credentials.email))?;
        self.user.clone().ok_or(ApiError::Unauthorized)
    }

    fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        self.record(format!("POST /auth/register {}", registration.email))?;
        Ok(user("new", &registration.name, registration.role))
    }

    fn logout(&self) -> Result<(), ApiError> {
        self.record("POST /auth/logout".to_string())
    }

    fn current_user(&self) -> Result<User, ApiError> {
        self.record("GET /auth/profile".to_string())?;
        self.user.clone().ok_or(ApiError::Unauthorized)
    }

    fn search_jobs(&self, params: &BTreeMap<String, String>) -> Result<Vec<JobListing>, ApiError> {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.record(format!("GET /jobs?{}", query.join("&")))?;
        Ok(self.jobs.clone())
    }

    fn get_job(&self, id: &str) -> Result<JobListing, ApiError> {
        self.record(format!("GET /jobs/{}", id))?;
        self.jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("job {}", id)))
    }

    fn apply_to_job(&self, id: &str, _request: &ApplicationRequest) -> Result<(), ApiError> {
        self.record(format!("POST /jobs/{}/apply", id))
    }

    fn my_applications(&self) -> Result<Vec<Application>, ApiError> {
        self.record("GET /applications/my".to_string())?;
        Ok(self.applications.clone())
    }

    fn update_application_status(&self, id: &str, status: ApplicationStatus) -> Result<(), ApiError> {
        self.record(format!("PATCH /applications/{} {}", id, status))
    }

    fn update_profile(&self, _profile: &Profile) -> Result<(), ApiError> {
        self.record("PUT /profile".to_string())
    }

    fn upload_resume(&self, file: &ResumeFile) -> Result<ResumeUploadResponse, ApiError> {
        self.record(format!("POST /profile/resume {}", file.name))?;
        Ok(ResumeUploadResponse {
            url: Some(format!("https://files.example.com/{}", file.name)),
            parsed_data: Some(ParsedResume {
                skills: self.parsed_skills.clone(),
                experience: Some(4.0),
            }),
        })
    }
}

pub fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        location: String::new(),
        phone: String::new(),
        bio: String::new(),
        skills: Vec::new(),
        experience: Vec::new(),
        education: Vec::new(),
        resume: None,
    }
}

pub fn listing(id: &str, title: &str, company: &str, days_old: i64) -> JobListing {
    JobListing {
        id: id.to_string(),
        title: title.to_string(),
        company: Company {
            name: company.to_string(),
            ..Default::default()
        },
        location: "Remote".to_string(),
        description: String::new(),
        skills: Vec::new(),
        salary_min: None,
        salary_max: None,
        posted_at: Some(Utc::now() - Duration::days(days_old)),
        job_type: None,
        experience_level: None,
        benefits: Vec::new(),
        application_deadline: None,
        has_applied: false,
    }
}

pub fn application(id: &str, status: ApplicationStatus) -> Application {
    let now = Utc::now();
    Application {
        id: id.to_string(),
        job: listing(id, "Engineer", "Acme", 10),
        status,
        applied_at: now - Duration::days(5),
        last_updated: Some(now - Duration::days(1)),
    }
}

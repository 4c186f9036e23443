//! REST client for the job board backend.

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::cookie::{CookieStore, Jar};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationRequest, ApplicationStatus, Credentials, JobListing, Profile,
    Registration, ResumeUploadResponse, User,
};
use crate::resume::ResumeFile;

/// Every backend call the client makes. Flows take `&dyn JobBoardApi` so they
/// can run against the HTTP client or an in-process stand-in.
pub trait JobBoardApi {
    fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;
    fn register(&self, registration: &Registration) -> Result<User, ApiError>;
    fn logout(&self) -> Result<(), ApiError>;
    fn current_user(&self) -> Result<User, ApiError>;

    fn search_jobs(&self, params: &BTreeMap<String, String>) -> Result<Vec<JobListing>, ApiError>;
    fn get_job(&self, id: &str) -> Result<JobListing, ApiError>;
    fn apply_to_job(&self, id: &str, request: &ApplicationRequest) -> Result<(), ApiError>;

    fn my_applications(&self) -> Result<Vec<Application>, ApiError>;
    fn update_application_status(&self, id: &str, status: ApplicationStatus) -> Result<(), ApiError>;

    fn update_profile(&self, profile: &Profile) -> Result<(), ApiError>;
    fn upload_resume(&self, file: &ResumeFile) -> Result<ResumeUploadResponse, ApiError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    fn into_user(self) -> User {
        match self {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobsEnvelope {
    Wrapped {
        #[serde(default)]
        jobs: Vec<JobListing>,
    },
    Bare(Vec<JobListing>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApplicationsEnvelope {
    Wrapped { applications: Vec<Application> },
    Bare(Vec<Application>),
}

/// Cookie-authenticated HTTP client.
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    origin: Url,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let origin = Url::parse(&config.api_url)
            .map_err(|e| ApiError::Url(format!("{}: {}", config.api_url, e)))?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            jar,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            origin,
        })
    }

    /// Seeds the jar from a `Cookie` header value saved with a session.
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.origin);
        }
    }

    /// Current cookies for the backend origin, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_string())),
            _ => {
                let body = response.text().unwrap_or_default();
                Err(ApiError::Server {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    fn json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = self.send(request, what)?;
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl JobBoardApi for HttpClient {
    fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let url = self.url("/auth/login");
        info!(url = %url, email = %credentials.email, "logging in");
        let envelope: UserEnvelope = self.json(self.client.post(&url).json(credentials), "login")?;
        Ok(envelope.into_user())
    }

    fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let url = self.url("/auth/register");
        info!(url = %url, email = %registration.email, role = %registration.role, "registering");
        let envelope: UserEnvelope = self.json(self.client.post(&url).json(registration), "register")?;
        Ok(envelope.into_user())
    }

    fn logout(&self) -> Result<(), ApiError> {
        let url = self.url("/auth/logout");
        info!(url = %url, "logging out");
        self.send(self.client.post(&url), "logout")?;
        Ok(())
    }

    fn current_user(&self) -> Result<User, ApiError> {
        let url = self.url("/auth/profile");
        let envelope: UserEnvelope = self.json(self.client.get(&url), "current user")?;
        Ok(envelope.into_user())
    }

    fn search_jobs(&self, params: &BTreeMap<String, String>) -> Result<Vec<JobListing>, ApiError> {
        let url = self.url("/jobs");
        info!(url = %url, params = ?params, "searching jobs");
        let envelope: JobsEnvelope = self.json(self.client.get(&url).query(params), "jobs")?;
        let jobs = match envelope {
            JobsEnvelope::Wrapped { jobs } => jobs,
            JobsEnvelope::Bare(jobs) => jobs,
        };
        info!(count = jobs.len(), "search complete");
        Ok(jobs)
    }

    fn get_job(&self, id: &str) -> Result<JobListing, ApiError> {
        let url = self.url(&format!("/jobs/{}", id));
        info!(url = %url, "fetching job");
        self.json(self.client.get(&url), &format!("job {}", id))
    }

    fn apply_to_job(&self, id: &str, request: &ApplicationRequest) -> Result<(), ApiError> {
        let url = self.url(&format!("/jobs/{}/apply", id));
        info!(url = %url, "submitting application");
        self.send(self.client.post(&url).json(request), &format!("job {}", id))?;
        Ok(())
    }

    fn my_applications(&self) -> Result<Vec<Application>, ApiError> {
        let url = self.url("/applications/my");
        info!(url = %url, "fetching applications");
        let envelope: ApplicationsEnvelope = self.json(self.client.get(&url), "applications")?;
        Ok(match envelope {
            ApplicationsEnvelope::Wrapped { applications } => applications,
            ApplicationsEnvelope::Bare(applications) => applications,
        })
    }

    fn update_application_status(&self, id: &str, status: ApplicationStatus) -> Result<(), ApiError> {
        let url = self.url(&format!("/applications/{}", id));
        info!(url = %url, status = %status, "updating application status");
        let body = serde_json::json!({ "status": status });
        self.send(self.client.patch(&url).json(&body), &format!("application {}", id))?;
        Ok(())
    }

    fn update_profile(&self, profile: &Profile) -> Result<(), ApiError> {
        let url = self.url("/profile");
        info!(url = %url, "saving profile");
        self.send(self.client.put(&url).json(profile), "profile")?;
        Ok(())
    }

    fn upload_resume(&self, file: &ResumeFile) -> Result<ResumeUploadResponse, ApiError> {
        let url = self.url("/profile/resume");
        info!(url = %url, file = %file.name, bytes = file.bytes.len(), "uploading resume");
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = multipart::Form::new().part("resume", part);
        self.json(self.client.post(&url).multipart(form), "resume upload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        let config = Config::from_lookup(|key| match key {
            "CAREERCONNECT_API_URL" => Some("http://localhost:5000/api/".to_string()),
            _ => None,
        })
        .unwrap();
        HttpClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        assert_eq!(client().url("/jobs/42"), "http://localhost:5000/api/jobs/42");
    }

    #[test]
    fn test_cookie_roundtrip_through_jar() {
        let http = client();
        assert!(http.cookie_header().is_none());
        http.restore_cookies("token=abc; theme=dark");
        let header = http.cookie_header().unwrap();
        assert!(header.contains("token=abc"));
        assert!(header.contains("theme=dark"));
    }

    #[test]
    fn test_envelopes_accept_wrapped_and_bare() {
        let wrapped: JobsEnvelope = serde_json::from_str(r#"{ "jobs": [{ "_id": "1", "title": "A" }] }"#).unwrap();
        assert!(matches!(wrapped, JobsEnvelope::Wrapped { ref jobs } if jobs.len() == 1));

        let bare: JobsEnvelope = serde_json::from_str(r#"[{ "_id": "1", "title": "A" }]"#).unwrap();
        assert!(matches!(bare, JobsEnvelope::Bare(ref jobs) if jobs.len() == 1));

        let user: UserEnvelope = serde_json::from_str(
            r#"{ "user": { "_id": "u", "name": "Ada", "email": "a@b.c", "role": "company" } }"#,
        )
        .unwrap();
        assert_eq!(user.into_user().name, "Ada");
    }

    #[test]
    #[ignore] // Requires a running backend
    fn test_search_against_local_backend() {
        let jobs = client().search_jobs(&BTreeMap::new());
        assert!(jobs.is_ok());
    }
}

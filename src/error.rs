use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum ResumeError {
    #[error("Please upload a PDF or Word document")]
    UnsupportedType(String),
    #[error("File size must be less than 5MB")]
    TooLarge(u64),
    #[error("An upload is already in progress")]
    InFlight,
    #[error("Upload failed. Please try again. ({0})")]
    Upload(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Only candidates can edit a profile")]
    NotCandidate,
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Unknown profile field '{0}'. Expected one of: name, email, location, phone, bio")]
    UnknownField(String),
    #[error("Failed to update profile. Please try again. ({0})")]
    Save(#[from] ApiError),
    #[error("Invalid e-mail pattern: {0}")]
    Pattern(#[from] regex::Error),
}

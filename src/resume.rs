use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::api::JobBoardApi;
use crate::error::ResumeError;
use crate::models::ResumeUploadResponse;

pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes,
        }
    }

    /// Reads a resume from disk. Oversized files are refused before reading.
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)
            .with_context(|| format!("Failed to read resume file: {}", path.display()))?
            .len();
        if size > MAX_RESUME_BYTES {
            return Err(ResumeError::TooLarge(size).into());
        }
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read resume file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(&name, mime_for(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type by extension, matching what the upload picker accepts.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Local checks run before anything touches the network.
pub fn validate(file: &ResumeFile) -> Result<(), ResumeError> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime.as_str()) {
        return Err(ResumeError::UnsupportedType(file.mime.clone()));
    }
    if file.size() > MAX_RESUME_BYTES {
        return Err(ResumeError::TooLarge(file.size()));
    }
    Ok(())
}

/// Single-shot resume upload. Overlapping uploads are refused.
#[derive(Debug, Default)]
pub struct ResumeUploader {
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ResumeUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(
        &self,
        api: &dyn JobBoardApi,
        file: &ResumeFile,
    ) -> Result<ResumeUploadResponse, ResumeError> {
        validate(file)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ResumeError::InFlight);
        }
        let _guard = InFlight(&self.in_flight);

        let response = api.upload_resume(file).map_err(|e| {
            tracing::warn!(error = %e, "resume upload failed");
            ResumeError::Upload(e)
        })?;
        tracing::info!(
            parsed_skills = response.parsed_data.as_ref().map(|p| p.skills.len()).unwrap_or(0),
            "resume uploaded"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use std::io::Write;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn test_rejects_six_mib_pdf_without_network() {
        let api = FakeApi::default();
        let file = ResumeFile::new("cv.pdf", "application/pdf", vec![0; 6 * MIB]);
        let result = ResumeUploader::new().upload(&api, &file);
        assert!(matches!(result, Err(ResumeError::TooLarge(_))));
        assert_eq!(result.unwrap_err().to_string(), "File size must be less than 5MB");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_accepts_four_mib_pdf() {
        let api = FakeApi::default();
        let file = ResumeFile::new("cv.pdf", "application/pdf", vec![0; 4 * MIB]);
        let result = ResumeUploader::new().upload(&api, &file);
        assert!(result.is_ok());
        assert_eq!(api.calls(), vec!["POST /profile/resume cv.pdf".to_string()]);
    }

    #[test]
    fn test_exactly_five_mib_is_allowed() {
        let file = ResumeFile::new("cv.docx", ALLOWED_MIME_TYPES[2], vec![0; 5 * MIB]);
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn test_rejects_other_types_without_network() {
        let api = FakeApi::default();
        let file = ResumeFile::new("cv.png", "image/png", vec![0; 10]);
        let err = ResumeUploader::new().upload(&api, &file).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a PDF or Word document");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_failed_upload_releases_guard() {
        let api = FakeApi::failing(500);
        let uploader = ResumeUploader::new();
        let file = ResumeFile::new("cv.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(matches!(uploader.upload(&api, &file), Err(ResumeError::Upload(_))));
        assert!(!uploader.in_flight.load(Ordering::SeqCst));
    }

    #[test]
    fn test_refuses_overlapping_upload() {
        let api = FakeApi::default();
        let uploader = ResumeUploader::new();
        uploader.in_flight.store(true, Ordering::SeqCst);
        let file = ResumeFile::new("cv.pdf", "application/pdf", vec![1]);
        assert!(matches!(uploader.upload(&api, &file), Err(ResumeError::InFlight)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_from_path_refuses_oversized_file() {
        let tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.as_file().set_len(MAX_RESUME_BYTES + 1).unwrap();
        let err = ResumeFile::from_path(tmp.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ResumeError>(), Some(ResumeError::TooLarge(_))));
        assert_eq!(err.to_string(), "File size must be less than 5MB");
    }

    #[test]
    fn test_from_path_detects_mime() {
        let mut tmp = tempfile::Builder::new().suffix(".DOCX").tempfile().unwrap();
        tmp.write_all(b"PK").unwrap();
        let file = ResumeFile::from_path(tmp.path()).unwrap();
        assert_eq!(file.mime, ALLOWED_MIME_TYPES[2]);
        assert_eq!(file.size(), 2);
        assert_eq!(mime_for(Path::new("notes.txt")), "application/octet-stream");
    }
}

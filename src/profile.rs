use regex::Regex;
use tracing::{info, warn};

use crate::api::JobBoardApi;
use crate::error::ProfileError;
use crate::models::{EducationEntry, ExperienceEntry, Profile, ResumeUploadResponse};
use crate::session::Session;

fn valid_email(email: &str) -> Result<bool, ProfileError> {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?;
    Ok(re.is_match(email))
}

/// Local copy of the candidate's profile. Edits stay local until `save`.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    saved: Profile,
    draft: Profile,
}

impl ProfileForm {
    pub fn for_session(session: &Session) -> Result<Self, ProfileError> {
        if !session.is_candidate() {
            return Err(ProfileError::NotCandidate);
        }
        let profile = Profile::from(&session.user);
        Ok(Self {
            saved: profile.clone(),
            draft: profile,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.draft
    }

    /// True while the draft holds edits the backend has not accepted.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    /// Drops unsaved edits.
    pub fn cancel(&mut self) {
        self.draft = self.saved.clone();
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ProfileError> {
        let slot = match field.to_ascii_lowercase().as_str() {
            "name" => &mut self.draft.name,
            "email" => &mut self.draft.email,
            "location" => &mut self.draft.location,
            "phone" => &mut self.draft.phone,
            "bio" => &mut self.draft.bio,
            _ => return Err(ProfileError::UnknownField(field.to_string())),
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Returns false when the skill is blank or already listed.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.draft.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.draft.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.draft.skills.len();
        self.draft.skills.retain(|s| s != skill.trim());
        self.draft.skills.len() != before
    }

    pub fn add_experience(&mut self, entry: ExperienceEntry) {
        self.draft.experience.push(entry);
    }

    pub fn add_education(&mut self, entry: EducationEntry) {
        self.draft.education.push(entry);
    }

    /// Unions skills parsed from an uploaded resume into the local list,
    /// keeping existing order. Returns how many were new.
    pub fn apply_resume(&mut self, response: &ResumeUploadResponse) -> usize {
        let Some(parsed) = &response.parsed_data else {
            return 0;
        };
        parsed.skills.iter().filter(|s| self.add_skill(s)).count()
    }

    pub fn save(&mut self, api: &dyn JobBoardApi) -> Result<&Profile, ProfileError> {
        let email = self.draft.email.trim();
        if !email.is_empty() && !valid_email(email)? {
            return Err(ProfileError::InvalidEmail(email.to_string()));
        }

        match api.update_profile(&self.draft) {
            Ok(()) => {
                self.saved = self.draft.clone();
                info!("profile saved");
                Ok(&self.saved)
            }
            Err(e) => {
                warn!(error = %e, "profile save failed");
                Err(ProfileError::Save(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParsedResume, Role};
    use crate::testing::{FakeApi, user};

    fn form() -> ProfileForm {
        let mut u = user("u1", "Ada", Role::Candidate);
        u.skills = vec!["Rust".to_string(), "SQL".to_string()];
        ProfileForm::for_session(&Session::new(u, None)).unwrap()
    }

    fn parsed(skills: &[&str]) -> ResumeUploadResponse {
        ResumeUploadResponse {
            url: None,
            parsed_data: Some(ParsedResume {
                skills: skills.iter().map(|s| s.to_string()).collect(),
                experience: None,
            }),
        }
    }

    #[test]
    fn test_company_cannot_edit_profile() {
        let session = Session::new(user("c1", "Acme", Role::Company), None);
        assert!(matches!(
            ProfileForm::for_session(&session),
            Err(ProfileError::NotCandidate)
        ));
    }

    #[test]
    fn test_skill_set_has_no_duplicates() {
        let mut f = form();
        assert!(!f.add_skill("Rust"));
        assert!(!f.add_skill("   "));
        assert!(f.add_skill(" Go "));
        assert_eq!(f.profile().skills, vec!["Rust", "SQL", "Go"]);
        assert!(f.remove_skill("SQL"));
        assert!(!f.remove_skill("SQL"));
        assert_eq!(f.profile().skills, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_resume_skills_are_merged_in_order() {
        let mut f = form();
        let added = f.apply_resume(&parsed(&["SQL", "Docker", "Rust", "Kubernetes", "Docker"]));
        assert_eq!(added, 2);
        assert_eq!(f.profile().skills, vec!["Rust", "SQL", "Docker", "Kubernetes"]);
        assert_eq!(f.apply_resume(&ResumeUploadResponse { url: None, parsed_data: None }), 0);
    }

    #[test]
    fn test_set_field() {
        let mut f = form();
        f.set_field("Location", " Lisbon ").unwrap();
        assert_eq!(f.profile().location, "Lisbon");
        assert!(f.is_dirty());
        assert!(matches!(f.set_field("salary", "1"), Err(ProfileError::UnknownField(_))));
    }

    #[test]
    fn test_save_commits_snapshot() {
        let api = FakeApi::default();
        let mut f = form();
        f.set_field("bio", "Systems programmer").unwrap();
        f.save(&api).unwrap();
        assert_eq!(api.calls(), vec!["PUT /profile".to_string()]);
        assert!(!f.is_dirty());
        f.cancel();
        assert_eq!(f.profile().bio, "Systems programmer");
    }

    #[test]
    fn test_failed_save_keeps_draft_and_snapshot() {
        let api = FakeApi::failing(500);
        let mut f = form();
        f.set_field("bio", "Systems programmer").unwrap();
        assert!(matches!(f.save(&api), Err(ProfileError::Save(_))));
        assert_eq!(f.profile().bio, "Systems programmer");
        assert!(f.is_dirty());

        f.cancel();
        assert_eq!(f.profile().bio, "");
        assert!(!f.is_dirty());
    }

    #[test]
    fn test_experience_and_education_entries() {
        let mut f = form();
        f.add_experience(ExperienceEntry {
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            duration: "2021 - 2024".to_string(),
            description: String::new(),
        });
        f.add_education(EducationEntry {
            degree: "BSc Computer Science".to_string(),
            school: "TU Delft".to_string(),
            year: "2020".to_string(),
        });
        assert!(f.is_dirty());
        assert_eq!(f.profile().experience[0].company, "Acme");
        assert_eq!(f.profile().education[0].year, "2020");
    }

    #[test]
    fn test_invalid_email_is_rejected_locally() {
        let api = FakeApi::default();
        let mut f = form();
        f.set_field("email", "not-an-email").unwrap();
        assert!(matches!(f.save(&api), Err(ProfileError::InvalidEmail(_))));
        assert!(api.calls().is_empty());

        assert!(valid_email("ada@example.com").unwrap());
        assert!(!valid_email("ada@example").unwrap());
        assert!(!valid_email("ada lovelace@example.com").unwrap());
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{Role, User};

/// The authenticated user plus the cookie credentials the backend issued.
///
/// Flows receive a `Option<&Session>` explicitly; nothing looks it up ambiently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub cookie: Option<String>,
}

impl Session {
    pub fn new(user: User, cookie: Option<String>) -> Self {
        Self { user, cookie }
    }

    pub fn is_candidate(&self) -> bool {
        self.user.role == Role::Candidate
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        let session = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file: {}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write session file: {}", path.display()))
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Navigation entries for the current visitor.
pub fn menu(session: Option<&Session>) -> Vec<&'static str> {
    let mut items = vec!["Jobs", "Companies"];
    match session.map(|s| s.user.role) {
        Some(Role::Company) => items.push("Dashboard"),
        Some(Role::Candidate) => items.extend(["Profile", "Applications"]),
        None => items.extend(["Login", "Register"]),
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::user;

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        assert!(Session::load(&path).unwrap().is_none());

        let session = Session::new(user("u1", "Ada", Role::Candidate), Some("token=abc".to_string()));
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), Some(session));

        Session::clear(&path).unwrap();
        assert!(Session::load(&path).unwrap().is_none());
        Session::clear(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Session::load(&path).is_err());
    }

    #[test]
    fn test_menu_by_role() {
        assert_eq!(menu(None), vec!["Jobs", "Companies", "Login", "Register"]);
        let company = Session::new(user("c", "Acme", Role::Company), None);
        assert_eq!(menu(Some(&company)), vec!["Jobs", "Companies", "Dashboard"]);
        let candidate = Session::new(user("u", "Ada", Role::Candidate), None);
        assert!(candidate.is_candidate());
        assert_eq!(menu(Some(&candidate)), vec!["Jobs", "Companies", "Profile", "Applications"]);
    }
}

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Client state that survives restarts: the last username and the bearer
/// token in use, if any. Passwords are never written.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalState {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Forgets the stored credential; the username is kept to prefill the
    /// login form.
    pub fn clear_credentials(&mut self) {
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = LocalState::load(path.to_str().unwrap()).unwrap();
        assert_eq!(state, LocalState::default());
    }

    #[test]
    fn save_then_load_keeps_username_and_drops_cleared_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state.json");
        let path = path.to_str().unwrap();

        let mut state = LocalState {
            username: Some("anna".to_string()),
            token: Some("tok".to_string()),
        };
        state.save(path).unwrap();
        assert_eq!(LocalState::load(path).unwrap(), state);

        state.clear_credentials();
        state.save(path).unwrap();
        let reloaded = LocalState::load(path).unwrap();
        assert_eq!(reloaded.username.as_deref(), Some("anna"));
        assert_eq!(reloaded.token, None);
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    config::{self, CLIENT_ID_VAR, CLIENT_SECRET_VAR},
    types::Credentials,
};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot write credentials file: {0}")]
    Io(#[from] std::io::Error),
}

/// Client credentials kept in the `.env` file of the data directory.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        CredentialStore { path }
    }

    pub fn default_location() -> Self {
        Self::new(config::env_file_path())
    }

    /// Credentials from the environment, falling back to the `.env` file.
    pub fn load(&self) -> Option<Credentials> {
        let from_env = config::required(CLIENT_ID_VAR)
            .ok()
            .zip(config::required(CLIENT_SECRET_VAR).ok())
            .map(|(id, secret)| Credentials::new(id, secret));

        from_env.or_else(|| self.load_file())
    }

    /// Credentials stored in the `.env` file only.
    pub fn load_file(&self) -> Option<Credentials> {
        let iter = dotenv::from_path_iter(&self.path).ok()?;

        let mut client_id = None;
        let mut client_secret = None;
        for (key, value) in iter.flatten() {
            match key.as_str() {
                CLIENT_ID_VAR => client_id = Some(value),
                CLIENT_SECRET_VAR => client_secret = Some(value),
                _ => {}
            }
        }

        match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some(Credentials::new(id, secret))
            }
            _ => None,
        }
    }

    /// Writes both keys into the `.env` file, keeping every other line.
    ///
    /// Creates the file and its directory when missing. Existing
    /// `SPOTIFY_API_AUTH_CLIENT_ID` / `SPOTIFY_API_AUTH_CLIENT_SECRET` lines
    /// are replaced in place, so saving twice never duplicates a key.
    ///
    /// # Errors
    ///
    /// [`CredentialError::Io`] when the directory or file cannot be read or
    /// written.
    pub async fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let existing = if self.path.is_file() {
            async_fs::read_to_string(&self.path).await?
        } else {
            String::new()
        };

        let content = upsert_env_lines(
            &existing,
            &[
                (CLIENT_ID_VAR, credentials.client_id.as_str()),
                (CLIENT_SECRET_VAR, credentials.client_secret.as_str()),
            ],
        );

        async_fs::write(&self.path, content).await?;
        Ok(())
    }
}

fn upsert_env_lines(existing: &str, entries: &[(&str, &str)]) -> String {
    let mut written = vec![false; entries.len()];
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            let key = line.split('=').next().unwrap_or_default().trim();
            match entries.iter().position(|(k, _)| *k == key) {
                Some(i) => {
                    written[i] = true;
                    format!("{}={}", entries[i].0, entries[i].1)
                }
                None => line.to_string(),
            }
        })
        .collect();

    for (i, (key, value)) in entries.iter().enumerate() {
        if !written[i] {
            lines.push(format!("{key}={value}"));
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

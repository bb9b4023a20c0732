//! Explicit user session, restored on start and cleared on sign-out.

use std::io::Write;
use std::path::{Path, PathBuf};

use es_client::{AuthClient, Session, SignUpOutcome, User};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    session: Option<Session>,
    file: Option<PathBuf>,
}

impl SessionContext {
    /// A context that is never persisted.
    pub fn in_memory(session: Option<Session>) -> Self {
        Self { session, file: None }
    }

    /// Reads the session file if it exists; an unreadable file is treated
    /// as signed out.
    pub fn restore(file: &Path) -> Self {
        let session = std::fs::read_to_string(file)
            .ok()
            .and_then(|content| match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(err) => {
                    debug!(path = %file.display(), %err, "ignoring unreadable session file");
                    None
                }
            });
        Self {
            session,
            file: Some(file.to_path_buf()),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn require(&self) -> AppResult<&Session> {
        self.session.as_ref().ok_or(AppError::NotAuthenticated)
    }

    fn establish(&mut self, session: Session) -> AppResult<()> {
        if let Some(file) = &self.file {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_private(file, &serde_json::to_string_pretty(&session)?)?;
        }
        info!(user = %session.user.id, "signed in");
        self.session = Some(session);
        Ok(())
    }

    fn clear(&mut self) -> AppResult<()> {
        self.session = None;
        if let Some(file) = &self.file
            && file.exists()
        {
            std::fs::remove_file(file)?;
        }
        Ok(())
    }

    pub async fn sign_in(
        &mut self,
        auth: &AuthClient,
        email: &str,
        password: &str,
    ) -> AppResult<&User> {
        let session = auth.sign_in(email.trim(), password).await?;
        self.establish(session)?;
        self.require().map(|s| &s.user)
    }

    /// Creates an account. Returns `true` when the provider signed the user in
    /// directly, `false` when an emailed code must be verified first.
    pub async fn sign_up(
        &mut self,
        auth: &AuthClient,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<bool> {
        check_new_password(password, confirm_password)?;
        match auth.sign_up(email.trim(), password).await? {
            SignUpOutcome::SignedIn(session) => {
                self.establish(session)?;
                Ok(true)
            }
            SignUpOutcome::ConfirmationRequired(_) => Ok(false),
        }
    }

    pub async fn verify(&mut self, auth: &AuthClient, email: &str, code: &str) -> AppResult<&User> {
        let session = auth.verify_otp(email.trim(), code.trim()).await?;
        self.establish(session)?;
        self.require().map(|s| &s.user)
    }

    pub async fn resend_verification(&self, auth: &AuthClient, email: &str) -> AppResult<()> {
        auth.resend_verification(email.trim()).await?;
        Ok(())
    }

    /// Refreshes the user from the provider; clears a session it rejects.
    pub async fn refresh_user(&mut self, auth: &AuthClient) -> AppResult<&User> {
        let token = self.require()?.access_token.clone();
        match auth.current_user(&token).await {
            Ok(user) => {
                if let Some(session) = self.session.as_mut() {
                    session.user = user;
                }
                self.require().map(|s| &s.user)
            }
            Err(es_client::ClientError::Auth { .. }) => {
                self.clear()?;
                Err(AppError::NotAuthenticated)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Ends the session locally even when the provider call fails.
    pub async fn sign_out(&mut self, auth: &AuthClient) -> AppResult<()> {
        let remote = match &self.session {
            Some(session) => auth.sign_out(&session.access_token).await,
            None => Ok(()),
        };
        self.clear()?;
        info!("signed out");
        remote.map_err(AppError::from)
    }
}

/// Writes the session file readable by its owner only; it holds tokens.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}

pub fn check_new_password(password: &str, confirm_password: &str) -> AppResult<()> {
    if password != confirm_password {
        return Err(AppError::InvalidInput("Passwords do not match".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert!(check_new_password("secret1", "secret1").is_ok());
        assert_eq!(
            check_new_password("secret1", "secret2").unwrap_err().to_string(),
            "Invalid input: Passwords do not match"
        );
        assert_eq!(
            check_new_password("abc", "abc").unwrap_err().to_string(),
            "Invalid input: Password must be at least 6 characters"
        );
    }

    #[test]
    fn missing_file_restores_signed_out() {
        let path = std::env::temp_dir().join("es_app_no_such_session.json");
        let _ = std::fs::remove_file(&path);
        let ctx = SessionContext::restore(&path);
        assert!(!ctx.is_signed_in());
        assert!(matches!(ctx.require(), Err(AppError::NotAuthenticated)));
    }

    #[test]
    fn session_survives_restart_until_cleared() {
        let path = std::env::temp_dir()
            .join(format!("es_app_session_{}", std::process::id()))
            .join("session.json");
        let session = Session {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: "u1".to_string(),
                email: Some("a@b.se".to_string()),
                email_confirmed_at: None,
            },
        };

        let mut ctx = SessionContext::restore(&path);
        ctx.establish(session.clone()).unwrap();

        let mut restored = SessionContext::restore(&path);
        assert_eq!(restored.session(), Some(&session));

        restored.clear().unwrap();
        assert!(!path.exists());
        assert!(!SessionContext::restore(&path).is_signed_in());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("es_app_session_mode_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        // A file left behind with loose permissions is tightened on write.
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut ctx = SessionContext::restore(&path);
        ctx.establish(Session {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
            user: User {
                id: "u1".to_string(),
                email: None,
                email_confirmed_at: None,
            },
        })
        .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(SessionContext::restore(&path).is_signed_in());
        let _ = std::fs::remove_dir_all(dir);
    }
}

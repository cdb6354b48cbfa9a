use log::info;

use super::credentials::CredentialService;
use super::error::AuthError;
use crate::modules::utils::logging::log_auth_event;

/// Authentication state of one interactive session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { identity: String },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// Username of the logged-in user, empty when anonymous
    pub fn identity(&self) -> &str {
        match self {
            Session::Anonymous => "",
            Session::Authenticated { identity } => identity,
        }
    }
}

/// Gatekeeper for the main application surface.
///
/// Starts anonymous; only a verified login moves it to authenticated and
/// only logout moves it back. Registration never changes the state.
#[derive(Debug, Default)]
pub struct SessionController {
    state: Session,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Session {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn identity(&self) -> &str {
        self.state.identity()
    }

    pub fn login(
        &mut self,
        credentials: &CredentialService<'_>,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if let Session::Authenticated { identity } = &self.state {
            return Err(AuthError::AlreadyAuthenticated(identity.clone()));
        }

        if username.is_empty() {
            log_auth_event("login", username, false, Some("empty username"));
            return Err(AuthError::InvalidCredentials);
        }

        if credentials.verify(username, password)? {
            self.state = Session::Authenticated {
                identity: username.to_string(),
            };
            log_auth_event("login", username, true, None);
            Ok(())
        } else {
            log_auth_event("login", username, false, Some("invalid credentials"));
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Drop back to anonymous, returning who was logged in
    pub fn logout(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            Session::Authenticated { identity } => {
                log_auth_event("logout", &identity, true, None);
                Some(identity)
            }
            Session::Anonymous => {
                info!("Logout requested without an active session");
                None
            }
        }
    }
}

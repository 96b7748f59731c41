//! Login / register / logout
//!
//! Failures are returned as a `LoginOutcome` instead of an error so a form
//! can show the server's message directly.

use mocking_api::{ApiError, Credentials};
use tracing::{info, warn};

use super::ViewStatus;
use crate::client::ApiClient;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub user: Option<String>,
}

impl LoginOutcome {
    fn failed(error: &ApiError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            user: None,
        }
    }
}

pub struct AuthView {
    client: ApiClient,
    pub status: ViewStatus,
}

impl AuthView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            status: ViewStatus::default(),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> LoginOutcome {
        self.status.saving = true;
        let outcome = self.do_login(&credentials(email, password)).await;
        self.status.saving = false;
        self.status.error = outcome.error.clone();
        outcome
    }

    /// Create the account, then log in with the same credentials.
    pub async fn register(&mut self, email: &str, password: &str) -> LoginOutcome {
        self.status.saving = true;
        let credentials = credentials(email, password);
        let outcome = match self.client.register(&credentials).await {
            Ok(_) => {
                info!("[AuthView] Registered {}", email);
                self.do_login(&credentials).await
            }
            Err(e) => {
                warn!("[AuthView] Registration failed: {}", e);
                LoginOutcome::failed(&e)
            }
        };
        self.status.saving = false;
        self.status.error = outcome.error.clone();
        outcome
    }

    pub async fn logout(&mut self) -> mocking_api::Result<()> {
        let result = self.client.logout().await;
        self.status.capture(result)
    }

    async fn do_login(&self, credentials: &Credentials) -> LoginOutcome {
        match self.client.login(credentials).await {
            Ok(_) => LoginOutcome {
                success: true,
                error: None,
                user: self.client.session().user().await,
            },
            Err(e) => {
                warn!("[AuthView] Login failed: {}", e);
                LoginOutcome::failed(&e)
            }
        }
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    }
}

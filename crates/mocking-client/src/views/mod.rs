//! Headless resource views
//!
//! Each view holds the transient state of one screen (list contents, editor
//! text, loading/error flags) and re-fetches from the server after every
//! mutation. Failures are kept in `ViewStatus::error` as the text a frontend
//! shows inline and are also returned to the caller.

use mocking_api::{ApiError, Result};

pub mod auth;
pub mod collections;
pub mod documents;
pub mod projects;
pub mod schema;

pub use auth::{AuthView, LoginOutcome};
pub use collections::CollectionsView;
pub use documents::DocumentEditor;
pub use projects::ProjectsView;
pub use schema::{GenerateReport, SchemaEditor};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewStatus {
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl ViewStatus {
    /// Record the outcome of a handler.
    ///
    /// Unauthorized errors are left to the session's sign-out signal and
    /// a declined confirmation is not an error, so neither is shown.
    pub fn capture<T>(&mut self, result: Result<T>) -> Result<T> {
        self.error = match &result {
            Ok(_) => None,
            Err(e) if e.is_unauthorized() => None,
            Err(ApiError::Cancelled) => self.error.take(),
            Err(e) => Some(e.to_string()),
        };
        result
    }
}

/// Asks the user before a destructive call.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything, for `--yes` and scripted use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub(crate) fn confirmed(confirm: &dyn Confirm, prompt: &str) -> Result<()> {
    if confirm.confirm(prompt) {
        Ok(())
    } else {
        Err(ApiError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_hides_unauthorized() {
        let mut status = ViewStatus::default();
        let _ = status.capture::<()>(Err(ApiError::Http {
            status: 500,
            message: "boom".to_string(),
        }));
        assert_eq!(status.error.as_deref(), Some("boom"));

        let _ = status.capture::<()>(Err(ApiError::Unauthorized {
            message: "HTTP 401".to_string(),
        }));
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_closures_confirm() {
        let deny = |_: &str| false;
        assert!(confirmed(&deny, "Delete?").is_err());
        assert!(confirmed(&AlwaysConfirm, "Delete?").is_ok());
    }
}

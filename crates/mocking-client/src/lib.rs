//! MockingCode API client
//!
//! - `transport`: the HTTP seam (`Transport`, `ReqwestTransport`)
//! - `client`: `ApiClient`, one method per endpoint
//! - `session`: held token and the sign-out signal
//! - `token_store`: persistence for the token
//! - `views`: headless state for the project, collection, document and schema screens
//! - `fake`: scripted transport for tests and offline use

pub mod client;
pub mod config;
pub mod fake;
pub mod session;
pub mod token_store;
pub mod transport;
pub mod views;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use fake::FakeTransport;
pub use session::{Session, SessionEvent, SignOutReason};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
pub use views::{
    AlwaysConfirm, AuthView, CollectionsView, Confirm, DocumentEditor, GenerateReport,
    LoginOutcome, ProjectsView, SchemaEditor, ViewStatus,
};

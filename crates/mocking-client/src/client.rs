//! REST client for the MockingCode API
//!
//! One method per endpoint. Every request carries `Content-Type:
//! application/json` and, while the session holds a token, a bearer
//! `Authorization` header. Non-2xx responses become `ApiError`s carrying the
//! server's message; a 401 from a non-auth endpoint also signs the session
//! out.

use mocking_api::{
    ApiError, AuthResponse, Collection, CreateCollectionRequest, CreateProjectRequest,
    Credentials, DocumentQuery, Field, FieldType, GenerateRequest, GenerateResponse, Listing,
    Project, RawDocument, RefreshRequest, Result, UpdateCollectionRequest, UpdateProjectRequest,
    ID_FIELD,
};
use mocking_core::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::session::{Session, SignOutReason};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

const AUTH_PREFIX: &str = "/auth/";

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post("/auth/register", credentials).await
    }

    /// Log in and hold the returned access token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.post("/auth/login", credentials).await?;
        let token = response
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::decode("login response carried no access token"))?;
        let user = response
            .email
            .clone()
            .unwrap_or_else(|| credentials.email.clone());
        self.session.sign_in(token, Some(user)).await?;
        Ok(response)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response: AuthResponse = self.post("/auth/refresh", &body).await?;
        if let Some(token) = response.access_token.as_deref().filter(|t| !t.is_empty()) {
            let user = match response.email.clone() {
                Some(email) => Some(email),
                None => self.session.user().await,
            };
            self.session.sign_in(token, user).await?;
        }
        Ok(response)
    }

    /// Local only: drops the held token.
    pub async fn logout(&self) -> Result<()> {
        self.session.sign_out(SignOutReason::Logout).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<Value> {
        Ok(self
            .execute(HttpRequest::new(Method::GET, "/health"))
            .await?
            .unwrap_or(Value::Null))
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let listing: Listing<Project> = self.get("/projects").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.get(&format!("/projects/{}", id)).await
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project> {
        self.post("/projects", request).await
    }

    pub async fn update_project(&self, id: i64, request: &UpdateProjectRequest) -> Result<()> {
        self.send_unit(Method::PUT, &format!("/projects/{}", id), Some(request))
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<()> {
        self.send_unit::<()>(Method::DELETE, &format!("/projects/{}", id), None)
            .await
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub async fn list_collections(&self, project_id: i64) -> Result<Vec<Collection>> {
        let listing: Listing<Collection> = self
            .get(&format!("/projects/{}/collections", project_id))
            .await?;
        Ok(listing.into_vec())
    }

    /// Create a collection. An empty schema is sent as just the `id` field.
    pub async fn create_collection(
        &self,
        project_id: i64,
        request: &CreateCollectionRequest,
    ) -> Result<Collection> {
        let mut request = request.clone();
        if request.fields.is_empty() {
            request.fields = vec![Field::new(ID_FIELD, FieldType::String).required()];
        }
        self.post(&format!("/projects/{}/collections", project_id), &request)
            .await
    }

    pub async fn update_collection(
        &self,
        project_id: i64,
        collection_id: i64,
        request: &UpdateCollectionRequest,
    ) -> Result<()> {
        self.send_unit(
            Method::PUT,
            &format!("/projects/{}/collections/{}", project_id, collection_id),
            Some(request),
        )
        .await
    }

    pub async fn delete_collection(&self, project_id: i64, collection_id: i64) -> Result<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("/projects/{}/collections/{}", project_id, collection_id),
            None,
        )
        .await
    }

    // =========================================================================
    // Documents (public data API)
    // =========================================================================

    pub async fn list_documents(
        &self,
        api_key: &str,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<RawDocument>> {
        let mut request = HttpRequest::new(Method::GET, data_path(api_key, collection));
        request.query = query.to_pairs();
        let listing: Listing<RawDocument> = decode(self.execute(request).await?)?;
        Ok(listing.into_vec())
    }

    pub async fn create_document(
        &self,
        api_key: &str,
        collection: &str,
        document: &Document,
    ) -> Result<()> {
        self.send_unit(Method::POST, &data_path(api_key, collection), Some(document))
            .await
    }

    pub async fn update_document(
        &self,
        api_key: &str,
        collection: &str,
        id: &str,
        document: &Document,
    ) -> Result<()> {
        self.send_unit(
            Method::PUT,
            &format!("{}/{}", data_path(api_key, collection), id),
            Some(document),
        )
        .await
    }

    pub async fn delete_document(&self, api_key: &str, collection: &str, id: &str) -> Result<()> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("{}/{}", data_path(api_key, collection), id),
            None,
        )
        .await
    }

    /// Delete every document of the collection.
    pub async fn flush_documents(&self, api_key: &str, collection: &str) -> Result<()> {
        self.send_unit::<()>(Method::DELETE, &data_path(api_key, collection), None)
            .await
    }

    pub async fn generate_documents(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.post("/generate", request).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.execute(HttpRequest::new(Method::GET, path)).await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let mut request = HttpRequest::new(Method::POST, path);
        request.body = Some(serde_json::to_value(body)?);
        decode(self.execute(request).await?)
    }

    async fn send_unit<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let mut request = HttpRequest::new(method, path);
        if let Some(body) = body {
            request.body = Some(serde_json::to_value(body)?);
        }
        self.execute(request).await?;
        Ok(())
    }

    /// Send `request` and return the parsed body; `None` for 204 or an empty body.
    async fn execute(&self, mut request: HttpRequest) -> Result<Option<Value>> {
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        let token = self.session.token().await;
        if let Some(token) = &token {
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let method = request.method.clone();
        let path = request.path.clone();
        debug!("[ApiClient] {} {}", method, path);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = error_message(&response);
            if response.status == 401 {
                if !path.starts_with(AUTH_PREFIX)
                    && self.session.handle_unauthorized(token.as_deref()).await
                {
                    warn!("[ApiClient] {} {} unauthorized, session signed out", method, path);
                }
                return Err(ApiError::Unauthorized { message });
            }
            error!(
                "[ApiClient] {} {} failed with {}: {}",
                method, path, response.status, message
            );
            return Err(ApiError::Http {
                status: response.status,
                message,
            });
        }

        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&response.body).map(Some).map_err(|e| {
            error!("[ApiClient] {} {} returned invalid JSON: {}", method, path, e);
            ApiError::from(e)
        })
    }
}

fn data_path(api_key: &str, collection: &str) -> String {
    format!("/{}/{}", api_key, collection)
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T> {
    let body = body.ok_or_else(|| ApiError::decode("empty response body"))?;
    Ok(serde_json::from_value(body)?)
}

/// Message of a non-2xx response: `message`, then `error`, then the reason
/// phrase, then `HTTP <code>`.
fn error_message(response: &HttpResponse) -> String {
    let from_body = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["message", "error"].iter().find_map(|key| {
                body.get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    from_body
        .or_else(|| response.reason.clone().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}

//! Project list
//!
//! Projects are created with a name and optional description; the server
//! issues the api key. Deletion cascades to collections and documents on the
//! server and therefore asks for confirmation first.

use mocking_api::{
    ApiError, CreateProjectRequest, Project, Result, UpdateProjectRequest,
};
use tracing::info;

use super::{confirmed, Confirm, ViewStatus};
use crate::client::ApiClient;

pub struct ProjectsView {
    client: ApiClient,
    pub projects: Vec<Project>,
    pub status: ViewStatus,
}

impl ProjectsView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            projects: Vec::new(),
            status: ViewStatus::default(),
        }
    }

    pub async fn load(&mut self) -> Result<&[Project]> {
        self.status.loading = true;
        let result = self.client.list_projects().await;
        self.status.loading = false;
        self.projects = self.status.capture(result)?;
        Ok(&self.projects)
    }

    pub fn find(&self, id: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub async fn create(&mut self, name: &str, description: Option<&str>) -> Result<Project> {
        let result = self.do_create(name, description).await;
        let project = self.status.capture(result)?;
        self.load().await?;
        Ok(project)
    }

    pub async fn update(
        &mut self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let request = UpdateProjectRequest {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
        };
        self.status.saving = true;
        let result = self.client.update_project(id, &request).await;
        self.status.saving = false;
        self.status.capture(result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn delete(&mut self, project: &Project, confirm: &dyn Confirm) -> Result<()> {
        let prompt = format!(
            "Delete project \"{}\" with all its collections and documents?",
            project.name
        );
        let result = match confirmed(confirm, &prompt) {
            Ok(()) => self.client.delete_project(project.id).await,
            Err(e) => Err(e),
        };
        self.status.capture(result)?;
        info!("[ProjectsView] Deleted project {}", project.id);
        self.load().await?;
        Ok(())
    }

    /// Public data-API base of `project`.
    pub fn api_url(&self, project: &Project) -> String {
        project.api_url(self.client.base_url())
    }

    async fn do_create(&mut self, name: &str, description: Option<&str>) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Project name must not be empty"));
        }
        let request = CreateProjectRequest {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        self.status.saving = true;
        let result = self.client.create_project(&request).await;
        self.status.saving = false;
        let project = result?;
        info!("[ProjectsView] Created project {} ({})", project.name, project.id);
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use crate::session::Session;
    use crate::token_store::MemoryTokenStore;
    use crate::transport::Method;
    use serde_json::json;
    use std::sync::Arc;

    async fn view() -> (ProjectsView, Arc<FakeTransport>) {
        let session = Session::open(Arc::new(MemoryTokenStore::with_token("tok")))
            .await
            .unwrap();
        let fake = Arc::new(FakeTransport::with_base_url("http://localhost:8080"));
        let client = ApiClient::new(fake.clone(), Arc::new(session));
        (ProjectsView::new(client), fake)
    }

    #[tokio::test]
    async fn test_create_reloads_list() {
        let (mut view, fake) = view().await;
        fake.respond(
            Method::POST,
            "/projects",
            201,
            json!({"id": 1, "name": "shop", "api_key": "k1"}),
        );
        fake.respond(
            Method::GET,
            "/projects",
            200,
            json!({"projects": [{"id": 1, "name": "shop", "api_key": "k1"}], "count": 1}),
        );

        let project = view.create("  shop ", Some("")).await.unwrap();
        assert_eq!(project.api_key, "k1");
        assert_eq!(view.projects.len(), 1);
        assert_eq!(view.api_url(&project), "http://localhost:8080/k1");

        let sent = fake.requests()[0].body.clone().unwrap();
        assert_eq!(sent, json!({"name": "shop"}));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_locally() {
        let (mut view, fake) = view().await;
        let err = view.create("   ", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(fake.request_count(), 0);
        assert!(view.status.error.is_some());
    }

    #[tokio::test]
    async fn test_server_error_is_shown() {
        let (mut view, fake) = view().await;
        fake.respond(Method::GET, "/projects", 500, json!({"message": "db down"}));
        assert!(view.load().await.is_err());
        assert_eq!(view.status.error.as_deref(), Some("db down"));
        assert!(!view.status.loading);
    }
}

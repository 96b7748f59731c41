//! Collections of one project
//!
//! Besides the list itself this view tracks a document count per collection,
//! used for the usage bar against `Limits::max_documents_per_collection`.

use mocking_api::{
    ApiError, Collection, CreateCollectionRequest, DocumentQuery, Field, Project, Result,
};
use mocking_core::{validate_fields, Limits};
use std::collections::HashMap;
use tracing::{info, warn};

use super::{confirmed, Confirm, ViewStatus};
use crate::client::ApiClient;

pub struct CollectionsView {
    client: ApiClient,
    project: Project,
    limits: Limits,
    pub collections: Vec<Collection>,
    /// Documents per collection id; a failed count reads as 0.
    pub document_counts: HashMap<i64, usize>,
    pub status: ViewStatus,
}

impl CollectionsView {
    pub fn new(client: ApiClient, project: Project, limits: Limits) -> Self {
        Self {
            client,
            project,
            limits,
            collections: Vec::new(),
            document_counts: HashMap::new(),
            status: ViewStatus::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub async fn load(&mut self) -> Result<&[Collection]> {
        self.status.loading = true;
        let result = self.client.list_collections(self.project.id).await;
        self.status.loading = false;
        self.collections = self.status.capture(result)?;
        self.load_document_counts().await;
        Ok(&self.collections)
    }

    async fn load_document_counts(&mut self) {
        let mut counts = HashMap::with_capacity(self.collections.len());
        for collection in &self.collections {
            let count = match self
                .client
                .list_documents(&self.project.api_key, &collection.name, &DocumentQuery::default())
                .await
            {
                Ok(documents) => documents.len(),
                Err(e) => {
                    warn!(
                        "[CollectionsView] Could not count documents of {}: {}",
                        collection.name, e
                    );
                    0
                }
            };
            counts.insert(collection.id, count);
        }
        self.document_counts = counts;
    }

    pub fn can_create(&self) -> bool {
        self.limits
            .check_collection_capacity(self.collections.len())
            .is_ok()
    }

    /// Create a collection; an empty `fields` becomes just the `id` field.
    pub async fn create(
        &mut self,
        name: &str,
        description: Option<&str>,
        fields: Vec<Field>,
    ) -> Result<Collection> {
        let result = self.do_create(name, description, fields).await;
        let collection = self.status.capture(result)?;
        self.load().await?;
        Ok(collection)
    }

    pub async fn delete(&mut self, collection: &Collection, confirm: &dyn Confirm) -> Result<()> {
        let prompt = format!(
            "Delete collection \"{}\" and all its documents?",
            collection.name
        );
        let result = match confirmed(confirm, &prompt) {
            Ok(()) => {
                self.client
                    .delete_collection(self.project.id, collection.id)
                    .await
            }
            Err(e) => Err(e),
        };
        self.status.capture(result)?;
        info!("[CollectionsView] Deleted collection {}", collection.name);
        self.load().await?;
        Ok(())
    }

    pub fn document_count(&self, collection: &Collection) -> usize {
        self.document_counts
            .get(&collection.id)
            .copied()
            .unwrap_or(0)
    }

    /// Fill ratio of `collection` against the per-collection document limit.
    pub fn usage(&self, collection: &Collection) -> f64 {
        self.limits.document_usage(self.document_count(collection))
    }

    /// Full public URL of the collection's data endpoint.
    pub fn public_url(&self, collection: &Collection) -> String {
        format!(
            "{}/{}",
            self.project.api_url(self.client.base_url()),
            collection.name
        )
    }

    async fn do_create(
        &mut self,
        name: &str,
        description: Option<&str>,
        fields: Vec<Field>,
    ) -> Result<Collection> {
        self.limits
            .check_collection_capacity(self.collections.len())?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Collection name must not be empty"));
        }
        validate_fields(&fields)?;

        let request = CreateCollectionRequest {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            fields,
        };
        self.status.saving = true;
        let result = self.client.create_collection(self.project.id, &request).await;
        self.status.saving = false;
        let collection = result?;
        info!(
            "[CollectionsView] Created collection {} in project {}",
            collection.name, self.project.id
        );
        Ok(collection)
    }
}

//! Document editor for one collection
//!
//! The editor is opened in one of three modes and produces JSON text to edit:
//! - create: an example document derived from the schema
//! - edit: the existing document without its id, gaps filled from the schema
//! - bulk: every listed document as one array
//!
//! `save` parses and validates the edited text before any request goes out.
//! A bulk save sends all updates concurrently and waits for every one of
//! them; if any fails the batch is reported as failed and the editor stays
//! open.

use futures::future::join_all;
use mocking_api::{document_id, ApiError, Collection, DocumentQuery, Project, RawDocument, Result};
use mocking_core::{
    bulk_template, create_template, edit_template, parse_editor_text, BulkEntry, EditorMode,
    EditorPayload,
};
use tracing::{error, info};

use super::{confirmed, Confirm, ViewStatus};
use crate::client::ApiClient;

pub struct DocumentEditor {
    client: ApiClient,
    api_key: String,
    collection: Collection,
    pub documents: Vec<RawDocument>,
    pub query: DocumentQuery,
    mode: Option<EditorMode>,
    pub status: ViewStatus,
}

impl DocumentEditor {
    pub fn new(client: ApiClient, project: &Project, collection: Collection) -> Self {
        Self {
            client,
            api_key: project.api_key.clone(),
            collection,
            documents: Vec::new(),
            query: DocumentQuery::default(),
            mode: None,
            status: ViewStatus::default(),
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Mode of the open editor, if any.
    pub fn mode(&self) -> Option<&EditorMode> {
        self.mode.as_ref()
    }

    pub async fn load(&mut self) -> Result<&[RawDocument]> {
        self.status.loading = true;
        let result = self
            .client
            .list_documents(&self.api_key, &self.collection.name, &self.query)
            .await;
        self.status.loading = false;
        self.documents = self.status.capture(result)?;
        Ok(&self.documents)
    }

    pub fn open_create(&mut self) -> String {
        self.mode = Some(EditorMode::Create);
        create_template(&self.collection.fields)
    }

    pub fn open_edit(&mut self, document: &RawDocument) -> Result<String> {
        let id = document_id(document)
            .ok_or_else(|| ApiError::validation("Document has no id"))?;
        self.mode = Some(EditorMode::Edit { id });
        Ok(edit_template(document, &self.collection.fields))
    }

    pub fn open_bulk(&mut self) -> String {
        self.mode = Some(EditorMode::Bulk);
        bulk_template(&self.documents, &self.collection.fields)
    }

    pub fn close(&mut self) {
        self.mode = None;
    }

    /// Submit the edited text for the open mode.
    ///
    /// On success the editor closes and the list is re-fetched.
    pub async fn save(&mut self, text: &str) -> Result<()> {
        self.status.saving = true;
        let result = self.submit(text).await;
        self.status.saving = false;
        self.status.capture(result)?;
        self.mode = None;
        self.load().await?;
        Ok(())
    }

    pub async fn delete(&mut self, document: &RawDocument, confirm: &dyn Confirm) -> Result<()> {
        let result = match document_id(document) {
            Some(id) => match confirmed(confirm, &format!("Delete document {}?", id)) {
                Ok(()) => {
                    self.client
                        .delete_document(&self.api_key, &self.collection.name, &id)
                        .await
                }
                Err(e) => Err(e),
            },
            None => Err(ApiError::validation("Document has no id")),
        };
        self.status.capture(result)?;
        self.load().await?;
        Ok(())
    }

    /// Delete every document of the collection.
    pub async fn flush(&mut self, confirm: &dyn Confirm) -> Result<()> {
        let prompt = format!(
            "Delete all documents of collection \"{}\"?",
            self.collection.name
        );
        let result = match confirmed(confirm, &prompt) {
            Ok(()) => {
                self.client
                    .flush_documents(&self.api_key, &self.collection.name)
                    .await
            }
            Err(e) => Err(e),
        };
        self.status.capture(result)?;
        info!("[DocumentEditor] Flushed collection {}", self.collection.name);
        self.load().await?;
        Ok(())
    }

    async fn submit(&self, text: &str) -> Result<()> {
        let mode = self
            .mode
            .as_ref()
            .ok_or_else(|| ApiError::validation("No document is open for editing"))?;
        let payload = parse_editor_text(mode, text, &self.collection.fields)?;

        match payload {
            EditorPayload::Create(document) => {
                self.client
                    .create_document(&self.api_key, &self.collection.name, &document)
                    .await
            }
            EditorPayload::Update { id, document } => {
                self.client
                    .update_document(&self.api_key, &self.collection.name, &id, &document)
                    .await
            }
            EditorPayload::Bulk(entries) => self.save_bulk(&entries).await,
        }
    }

    async fn save_bulk(&self, entries: &[BulkEntry]) -> Result<()> {
        let updates = entries.iter().map(|entry| {
            self.client.update_document(
                &self.api_key,
                &self.collection.name,
                &entry.id,
                &entry.document,
            )
        });
        let results = join_all(updates).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            error!(
                "[DocumentEditor] Bulk save: {} of {} updates failed",
                failed,
                results.len()
            );
        } else {
            info!("[DocumentEditor] Bulk save updated {} documents", results.len());
        }
        results.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
    }
}

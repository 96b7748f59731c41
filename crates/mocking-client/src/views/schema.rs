//! Schema editor and data generator for one collection
//!
//! The view starts in generator mode. `begin_edit` unlocks the draft for
//! field edits; `save` validates and stores it, `cancel_edit` drops the
//! edits.

use mocking_api::{
    ApiError, Collection, Field, GenerateRequest, Project, Result, UpdateCollectionRequest,
};
use mocking_core::{Document, FieldEdit, Presence, SchemaDraft};
use tracing::{info, warn};

use super::ViewStatus;
use crate::client::ApiClient;

pub const DEFAULT_GENERATE_COUNT: u32 = 10;
pub const MAX_GENERATE_COUNT: u32 = 100;

/// Outcome of a generate-and-save run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub generated: usize,
    pub saved: usize,
}

pub struct SchemaEditor {
    client: ApiClient,
    project_id: i64,
    api_key: String,
    collection: Collection,
    draft: SchemaDraft,
    editing: bool,
    generate_count: u32,
    pub status: ViewStatus,
}

impl SchemaEditor {
    pub fn new(client: ApiClient, project: &Project, collection: Collection) -> Self {
        let draft = SchemaDraft::from_fields(&collection.fields);
        Self {
            client,
            project_id: project.id,
            api_key: project.api_key.clone(),
            collection,
            draft,
            editing: false,
            generate_count: DEFAULT_GENERATE_COUNT,
            status: ViewStatus::default(),
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn fields(&self) -> &[Field] {
        self.draft.fields()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    pub fn cancel_edit(&mut self) {
        self.draft.reset();
        self.editing = false;
        self.status.error = None;
    }

    pub fn add_field(&mut self) -> Result<usize> {
        self.ensure_editing()?;
        Ok(self.draft.add_field())
    }

    pub fn update_field(&mut self, index: usize, edit: FieldEdit) -> Result<()> {
        self.ensure_editing()?;
        self.draft.update_field(index, edit)?;
        Ok(())
    }

    pub fn remove_field(&mut self, index: usize) -> Result<Field> {
        self.ensure_editing()?;
        Ok(self.draft.remove_field(index)?)
    }

    /// Validate the draft and store it as the collection's schema.
    pub async fn save(&mut self) -> Result<()> {
        let result = self.do_save().await;
        self.status.capture(result)
    }

    pub fn generate_count(&self) -> u32 {
        self.generate_count
    }

    /// Set how many documents `generate` asks for, clamped to `1..=100`.
    pub fn set_generate_count(&mut self, count: u32) -> u32 {
        self.generate_count = count.clamp(1, MAX_GENERATE_COUNT);
        self.generate_count
    }

    /// Ask the server for example documents and store each one.
    ///
    /// Documents that fail to store are logged and skipped.
    pub async fn generate(&mut self) -> Result<GenerateReport> {
        let result = self.do_generate().await;
        self.status.capture(result)
    }

    fn ensure_editing(&self) -> Result<()> {
        if self.editing {
            Ok(())
        } else {
            Err(ApiError::validation("Schema is not being edited"))
        }
    }

    async fn do_save(&mut self) -> Result<()> {
        let fields = self.draft.to_payload()?;
        let request = UpdateCollectionRequest {
            fields: Some(fields.clone()),
            ..Default::default()
        };

        self.status.saving = true;
        let result = self
            .client
            .update_collection(self.project_id, self.collection.id, &request)
            .await;
        self.status.saving = false;
        result?;

        info!(
            "[SchemaEditor] Saved {} fields for {}",
            fields.len(),
            self.collection.name
        );
        self.collection.fields = fields;
        self.draft.mark_saved();
        self.editing = false;
        Ok(())
    }

    async fn do_generate(&mut self) -> Result<GenerateReport> {
        let fields = self.draft.fields().to_vec();
        let request = GenerateRequest {
            fields: fields.clone(),
            count: self.generate_count,
            seed: None,
        };

        self.status.saving = true;
        let result = self.store_generated(&request, &fields).await;
        self.status.saving = false;
        result
    }

    async fn store_generated(
        &self,
        request: &GenerateRequest,
        fields: &[Field],
    ) -> Result<GenerateReport> {
        let response = self.client.generate_documents(request).await?;

        let mut saved = 0;
        for raw in &response.documents {
            let document = match Document::from_raw(raw, fields, Presence::Partial) {
                Ok(document) => document,
                Err(e) => {
                    warn!("[SchemaEditor] Skipping generated document: {}", e);
                    continue;
                }
            };
            match self
                .client
                .create_document(&self.api_key, &self.collection.name, &document)
                .await
            {
                Ok(()) => saved += 1,
                Err(e) => warn!("[SchemaEditor] Failed to save generated document: {}", e),
            }
        }

        let generated = if response.count > 0 {
            response.count
        } else {
            response.documents.len()
        };
        info!(
            "[SchemaEditor] Generated {} documents for {}, saved {}",
            generated, self.collection.name, saved
        );
        Ok(GenerateReport { generated, saved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use crate::session::Session;
    use crate::token_store::MemoryTokenStore;
    use crate::transport::Method;
    use mocking_api::FieldType;
    use serde_json::json;
    use std::sync::Arc;

    async fn editor(fields: serde_json::Value) -> (SchemaEditor, Arc<FakeTransport>) {
        let session = Session::open(Arc::new(MemoryTokenStore::with_token("tok")))
            .await
            .unwrap();
        let fake = Arc::new(FakeTransport::new());
        let client = ApiClient::new(fake.clone(), Arc::new(session));
        let project: Project =
            serde_json::from_value(json!({"id": 1, "name": "shop", "api_key": "k1"})).unwrap();
        let collection: Collection = serde_json::from_value(json!({
            "id": 10,
            "project_id": 1,
            "name": "users",
            "fields": fields
        }))
        .unwrap();
        (SchemaEditor::new(client, &project, collection), fake)
    }

    #[tokio::test]
    async fn test_id_field_is_prepended_and_locked() {
        let (mut editor, _fake) = editor(json!([{"name": "email", "type": "string"}])).await;
        assert!(editor.fields()[0].is_id());
        assert!(editor.fields()[0].read_only);

        editor.begin_edit();
        assert!(editor.remove_field(0).is_err());
        assert!(editor.update_field(1, FieldEdit::Required(true)).is_ok());
    }

    #[tokio::test]
    async fn test_edits_require_edit_mode() {
        let (mut editor, _fake) = editor(json!([])).await;
        assert!(editor.add_field().is_err());
        editor.begin_edit();
        let index = editor.add_field().unwrap();
        assert_eq!(index, 1);
        editor.cancel_edit();
        assert_eq!(editor.fields().len(), 1);
        assert!(!editor.is_editing());
    }

    #[tokio::test]
    async fn test_duplicate_names_block_save() {
        let (mut editor, fake) = editor(json!([{"name": "email", "type": "string"}])).await;
        editor.begin_edit();
        let index = editor.add_field().unwrap();
        editor
            .update_field(index, FieldEdit::Name("email".to_string()))
            .unwrap();

        let err = editor.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate field: email");
        assert_eq!(fake.request_count(), 0);
        assert!(editor.is_editing());
    }

    #[tokio::test]
    async fn test_save_puts_fields() {
        let (mut editor, fake) = editor(json!([])).await;
        fake.respond(Method::PUT, "/projects/1/collections/10", 200, json!({}));
        editor.begin_edit();
        let index = editor.add_field().unwrap();
        editor
            .update_field(index, FieldEdit::Name("score".to_string()))
            .unwrap();
        editor
            .update_field(index, FieldEdit::Type(FieldType::Number))
            .unwrap();

        editor.save().await.unwrap();
        assert!(!editor.is_editing());
        assert_eq!(editor.collection().fields.len(), 2);
        let body = fake.last_request().unwrap().body.unwrap();
        assert_eq!(body["fields"][1]["name"], "score");
        assert_eq!(body["fields"][1]["type"], "number");
        assert!(body.get("name").is_none());
    }

    #[tokio::test]
    async fn test_generate_count_is_clamped() {
        let (mut editor, _fake) = editor(json!([])).await;
        assert_eq!(editor.generate_count(), 10);
        assert_eq!(editor.set_generate_count(0), 1);
        assert_eq!(editor.set_generate_count(1000), 100);
    }

    #[tokio::test]
    async fn test_generate_counts_saved_documents() {
        let (mut editor, fake) = editor(json!([{"name": "email", "type": "string"}])).await;
        fake.respond(
            Method::POST,
            "/generate",
            200,
            json!({
                "documents": [
                    {"id": "1", "email": "a@example.com"},
                    {"id": "2", "email": "b@example.com"},
                    {"id": "3", "email": "c@example.com"}
                ],
                "count": 3
            }),
        );
        fake.respond(Method::POST, "/k1/users", 201, json!({}))
            .respond(Method::POST, "/k1/users", 500, json!({"error": "full"}))
            .respond(Method::POST, "/k1/users", 201, json!({}));

        let report = editor.generate().await.unwrap();
        assert_eq!(report, GenerateReport { generated: 3, saved: 2 });

        let requests = fake.requests();
        assert_eq!(requests[0].body.as_ref().unwrap()["count"], 10);
        assert_eq!(
            requests[1].body,
            Some(json!({"email": "a@example.com"}))
        );
    }
}

//! Wire models for the MockingCode REST API
//!
//! Field names follow the backend's JSON (`snake_case`, except the schema's
//! `readOnly` flag which the editor has always sent in camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::RawDocument;

/// Name of the implicit, server-assigned document key.
pub const ID_FIELD: &str = "id";

/// Type of a schema field.
///
/// Unknown names survive a decode/encode round trip as `Other` so that a
/// schema written by a newer server is not silently rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Other(String),
}

impl FieldType {
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::parse(&s)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One entry of a collection's field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(rename = "readOnly", default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: None,
            required: false,
            read_only: false,
            unique: false,
            min: None,
            max: None,
            options: None,
        }
    }

    /// The implicit `id` field every collection carries.
    pub fn id_field() -> Self {
        Self {
            required: true,
            read_only: true,
            ..Self::new(ID_FIELD, FieldType::String)
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Format as the lookup key the editor uses; absent and empty are the same.
    pub fn format_str(&self) -> &str {
        self.format.as_deref().unwrap_or("")
    }

    pub fn is_id(&self) -> bool {
        self.name == ID_FIELD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,

    #[serde(default)]
    pub user_id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Public routing key of the tenant, first segment of every data-API path.
    pub api_key: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub collections_count: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Base URL of the project's public data API.
    ///
    /// Falls back to `<api_url>/<api_key>` when the server did not send one.
    pub fn api_url(&self, api_url: &str) -> String {
        match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}/{}", api_url.trim_end_matches('/'), self.api_key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server-side generation settings stored with a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,

    #[serde(default)]
    pub project_id: i64,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: Vec<Field>,

    #[serde(default)]
    pub config: Option<CollectionConfig>,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Collection {
    /// Public data-API path of the collection under the given project key.
    pub fn data_path(&self, api_key: &str) -> String {
        format!("/{}/{}", api_key, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by `/auth/register`, `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub fields: Vec<Field>,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documents: Vec<RawDocument>,
    #[serde(default)]
    pub count: usize,
}

/// A list response, either bare or wrapped in a `{<resource>: [...], count}`
/// envelope. A `null` list inside the envelope reads as empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Envelope {
        #[serde(
            alias = "projects",
            alias = "collections",
            alias = "documents"
        )]
        items: Option<Vec<T>>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Envelope { items, .. } => items.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query options of the document list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl DocumentQuery {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none() && self.sort.is_none() && self.order.is_none()
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order".to_string(), order.as_str().to_string()));
        }
        pairs
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_round_trips_unknown_names() {
        let field: Field = serde_json::from_value(json!({
            "name": "location",
            "type": "geo",
            "required": false
        }))
        .unwrap();
        assert_eq!(field.field_type, FieldType::Other("geo".to_string()));
        assert!(!field.field_type.is_known());

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "geo");
    }

    #[test]
    fn test_id_field_serializes_read_only_in_camel_case() {
        let value = serde_json::to_value(Field::id_field()).unwrap();
        assert_eq!(
            value,
            json!({"name": "id", "type": "string", "required": true, "readOnly": true})
        );
    }

    #[test]
    fn test_listing_accepts_envelope_and_bare_array() {
        let body = json!({"projects": [{"id": 1, "name": "shop", "api_key": "k1"}], "count": 1});
        let listing: Listing<Project> = serde_json::from_value(body).unwrap();
        let projects = listing.into_vec();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].api_key, "k1");

        let body = json!([{"id": 2, "name": "blog", "api_key": "k2"}]);
        let listing: Listing<Project> = serde_json::from_value(body).unwrap();
        assert_eq!(listing.into_vec()[0].id, 2);
    }

    #[test]
    fn test_listing_null_items_is_empty() {
        let listing: Listing<Collection> =
            serde_json::from_value(json!({"collections": null, "count": 0})).unwrap();
        assert!(listing.into_vec().is_empty());

        let listing: Listing<Collection> = serde_json::from_value(json!({})).unwrap();
        assert!(listing.into_vec().is_empty());
    }

    #[test]
    fn test_collection_decodes_go_shape() {
        let collection: Collection = serde_json::from_value(json!({
            "id": 7,
            "project_id": 3,
            "name": "users",
            "description": "",
            "fields": null,
            "config": {"count": 10},
            "is_active": true,
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "0001-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(collection.fields.is_empty());
        assert_eq!(collection.config.as_ref().unwrap().count, 10);
        assert_eq!(collection.data_path("abc"), "/abc/users");
    }

    #[test]
    fn test_project_api_url_falls_back_to_api_key() {
        let mut project: Project =
            serde_json::from_value(json!({"id": 1, "name": "shop", "api_key": "k1"})).unwrap();
        assert_eq!(project.api_url("http://localhost:8080/"), "http://localhost:8080/k1");

        project.base_url = Some("https://k1.mockingcode.org".to_string());
        assert_eq!(project.api_url("http://localhost:8080"), "https://k1.mockingcode.org");
    }

    #[test]
    fn test_document_query_pairs() {
        let query = DocumentQuery {
            limit: Some(10),
            sort: Some("created_at".to_string()),
            order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("limit".to_string(), "10".to_string()),
                ("sort".to_string(), "created_at".to_string()),
                ("order".to_string(), "desc".to_string()),
            ]
        );
        assert!(DocumentQuery::default().is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}

use chrono::{DateTime, FixedOffset, Local};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Represents an article stored in MongoDB.
///
/// Corresponds to the `articles` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// System-assigned identifier.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Human-readable name.
    pub name: String,
    /// Raw text content.
    pub content: String,
    /// Hex SHA-256 of `content` as it was when the article was created.
    pub hash: String,
    /// Optional URL the content was taken from.
    #[serde(default)]
    pub from_url: Option<String>,
    /// Whether the owner flagged the article as recommended.
    #[serde(default)]
    pub recommendation: bool,
    /// Optional project the article belongs to.
    #[serde(default)]
    pub project: Option<String>,
    /// User id of the owner. Never changes after creation.
    pub created_by: String,
    /// Server local time at creation.
    pub created_at: DateTime<FixedOffset>,
}

/// Validated, user-editable article fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleFields {
    pub name: String,
    pub content: String,
    pub from_url: Option<String>,
    pub recommendation: bool,
    pub project: Option<String>,
}

impl Article {
    /// Build a new article owned by `owner`, stamping id, hash and creation time.
    pub fn create(fields: ArticleFields, owner: &str) -> Self {
        Self {
            id: ObjectId::new(),
            hash: content_hash(&fields.content),
            name: fields.name,
            content: fields.content,
            from_url: fields.from_url,
            recommendation: fields.recommendation,
            project: fields.project,
            created_by: owner.to_string(),
            created_at: Local::now().fixed_offset(),
        }
    }

    /// Overwrite the editable fields. Owner, id, hash and creation time are kept.
    pub fn apply(&mut self, fields: ArticleFields) {
        self.name = fields.name;
        self.content = fields.content;
        self.from_url = fields.from_url;
        self.recommendation = fields.recommendation;
        self.project = fields.project;
    }

    /// Recompute the stored hash from the current content.
    pub fn refresh_hash(&mut self) {
        self.hash = content_hash(&self.content);
    }
}

/// Lowercase hex SHA-256 digest of the UTF-8 bytes of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

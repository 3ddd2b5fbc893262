//! Audit record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;

/// An immutable record of one action taken against a document or version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuditRecord {
    /// Unique audit record identifier.
    pub id: Uuid,
    /// The document acted on, if any.
    pub document_id: Option<Uuid>,
    /// The version acted on, if any.
    pub version_id: Option<Uuid>,
    /// What happened.
    pub action: AuditAction,
    /// Who did it. `None` for anonymous public access.
    pub actor_id: Option<Uuid>,
    /// Client address the request came from.
    pub origin: Option<String>,
    /// Free-text detail.
    pub detail: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditRecord {
    /// The document acted on.
    pub document_id: Option<Uuid>,
    /// The version acted on.
    pub version_id: Option<Uuid>,
    /// What happened.
    pub action: AuditAction,
    /// Who did it.
    pub actor_id: Option<Uuid>,
    /// Client address.
    pub origin: Option<String>,
    /// Free-text detail.
    pub detail: Option<String>,
}

impl NewAuditRecord {
    /// Start a record for `action` with every reference unset.
    pub fn new(action: AuditAction) -> Self {
        Self {
            document_id: None,
            version_id: None,
            action,
            actor_id: None,
            origin: None,
            detail: None,
        }
    }

    /// Set the document reference.
    pub fn document(mut self, document_id: Uuid) -> Self {
        self.document_id = Some(document_id);
        self
    }

    /// Set the version reference.
    pub fn version(mut self, version_id: Option<Uuid>) -> Self {
        self.version_id = version_id;
        self
    }

    /// Set the actor.
    pub fn actor(mut self, actor_id: Option<Uuid>) -> Self {
        self.actor_id = actor_id;
        self
    }

    /// Set the client address.
    pub fn origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    /// Set the free-text detail.
    pub fn detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Materialize the row as it will be stored.
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            id,
            document_id: self.document_id,
            version_id: self.version_id,
            action: self.action,
            actor_id: self.actor_id,
            origin: self.origin,
            detail: self.detail,
            created_at,
        }
    }
}

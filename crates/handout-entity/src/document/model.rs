//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named artifact whose content is kept as a sequence of versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Display title, unique per owner.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// The document owner.
    pub owner_id: Uuid,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// The version considered authoritative for default downloads.
    /// `None` until the first upload commits.
    pub current_version_id: Option<Uuid>,
}

impl Document {
    /// Whether the given user may read or modify this document.
    pub fn is_accessible_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.owner_id == user_id
    }
}

/// Data required to find or create a document for an `(owner, title)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// The document owner.
    pub owner_id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional description, only used when the document is created.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(owner_id: Uuid) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "Week 1".into(),
            description: None,
            owner_id,
            created_at: Utc::now(),
            current_version_id: None,
        }
    }

    #[test]
    fn test_owner_and_admin_have_access() {
        let owner = Uuid::new_v4();
        let doc = document(owner);
        assert!(doc.is_accessible_by(owner, false));
        assert!(doc.is_accessible_by(Uuid::new_v4(), true));
        assert!(!doc.is_accessible_by(Uuid::new_v4(), false));
    }
}

//! Request context carrying the caller identity supplied by the transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Identity is established outside the engine; every operation only
/// decides whether this caller may act on a given document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Whether the user has administrative rights over all documents.
    pub is_admin: bool,
    /// Client address the request came from.
    pub origin: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for a regular user.
    pub fn new(user_id: Uuid, origin: Option<String>) -> Self {
        Self {
            user_id,
            is_admin: false,
            origin,
            request_time: Utc::now(),
        }
    }

    /// Creates a context for an administrator.
    pub fn admin(user_id: Uuid, origin: Option<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::new(user_id, origin)
        }
    }
}

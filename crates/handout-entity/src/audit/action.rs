//! Audit action enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of action an audit record documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A new version was uploaded.
    Upload,
    /// A version was downloaded by an authenticated user.
    Download,
    /// The current pointer was moved to a historical version.
    Restore,
    /// Deletion of a document was requested.
    Delete,
    /// A public share was created.
    ShareCreated,
    /// The current version was downloaded through a public share.
    PublicDownload,
}

impl AuditAction {
    /// Return the action as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "UPLOAD",
            Self::Download => "DOWNLOAD",
            Self::Restore => "RESTORE",
            Self::Delete => "DELETE",
            Self::ShareCreated => "SHARE_CREATED",
            Self::PublicDownload => "PUBLIC_DOWNLOAD",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = handout_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UPLOAD" => Ok(Self::Upload),
            "DOWNLOAD" => Ok(Self::Download),
            "RESTORE" => Ok(Self::Restore),
            "DELETE" => Ok(Self::Delete),
            "SHARE_CREATED" => Ok(Self::ShareCreated),
            "PUBLIC_DOWNLOAD" => Ok(Self::PublicDownload),
            other => Err(handout_core::AppError::validation(format!(
                "Unknown audit action: {other}"
            ))
            .on_field("action")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_agree() {
        for action in [
            AuditAction::Upload,
            AuditAction::Download,
            AuditAction::Restore,
            AuditAction::Delete,
            AuditAction::ShareCreated,
            AuditAction::PublicDownload,
        ] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert_eq!("share_created".parse::<AuditAction>().unwrap(), AuditAction::ShareCreated);
        assert!("RENAME".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_serializes_as_upper_snake_case() {
        let json = serde_json::to_string(&AuditAction::PublicDownload).unwrap();
        assert_eq!(json, "\"PUBLIC_DOWNLOAD\"");
    }
}

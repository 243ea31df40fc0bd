//! Operation kind value object - which batch operation a plugin performs

use serde::{Deserialize, Serialize};

/// Kind of batch operation run against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Deploy local files to the target
    Upload,
    /// Pull files from the target into the workspace
    Download,
    /// Remove files from the target
    Delete,
    /// Enumerate a directory on the target
    List,
}

impl OperationKind {
    /// Lowercase verb used in messages and events
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Upload => "upload",
            OperationKind::Download => "download",
            OperationKind::Delete => "delete",
            OperationKind::List => "list",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_kind_display() {
        assert_eq!(OperationKind::Upload.to_string(), "upload");
        assert_eq!(OperationKind::List.to_string(), "list");
    }

    #[test]
    fn operation_kind_serde_lowercase() {
        let kind: OperationKind = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(kind, OperationKind::Delete);
    }
}

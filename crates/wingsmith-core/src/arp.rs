use serde::{Deserialize, Serialize};

/// Add/Remove Programs metadata an installed application reports about itself.
///
/// Each value is only recorded when it differs from the package-level value
/// it would otherwise duplicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AppsAndFeaturesEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_code: Option<String>,
}

impl AppsAndFeaturesEntry {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.publisher.is_none()
            && self.display_version.is_none()
            && self.upgrade_code.is_none()
    }
}

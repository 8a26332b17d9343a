use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InstallerSwitches {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent_with_progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl InstallerSwitches {
    /// True when no switch carries a non-whitespace value.
    pub fn are_all_blank(&self) -> bool {
        [
            &self.silent,
            &self.silent_with_progress,
            &self.interactive,
            &self.install_location,
            &self.log,
            &self.upgrade,
            &self.custom,
        ]
        .into_iter()
        .all(|value| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

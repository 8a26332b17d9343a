use serde::{Deserialize, Serialize};
use wingsmith_core::{
    AppsAndFeaturesEntry, Architecture, InstallMode, InstallerDetection, InstallerSwitches,
    InstallerType, Platform, Scope, UpgradeBehavior,
};

/// Values supplied by the caller for a single installer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerInput {
    pub installer_locale: Option<String>,
    pub architecture: Option<Architecture>,
    pub installer_type: Option<InstallerType>,
    pub scope: Option<Scope>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub installer_switches: InstallerSwitches,
    pub upgrade_behavior: Option<UpgradeBehavior>,
    pub product_code: Option<String>,
}

/// Overrides that beat anything detected or carried over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalMetadata {
    pub product_code: Option<String>,
    pub release_date: Option<String>,
    pub apps_and_features_entry: Option<AppsAndFeaturesEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerRequest {
    pub detection: InstallerDetection,
    #[serde(default)]
    pub input: InstallerInput,
    pub additional_metadata: Option<AdditionalMetadata>,
}

impl InstallerRequest {
    pub fn new(detection: InstallerDetection) -> Self {
        Self {
            detection,
            input: InstallerInput::default(),
            additional_metadata: None,
        }
    }
}

/// Manifest-level values supplied by the caller.
///
/// Shared fields set here win over whatever the installers agree on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestInput {
    pub installer_locale: Option<String>,
    pub platform: Option<Vec<Platform>>,
    pub minimum_os_version: Option<String>,
    pub installer_type: Option<InstallerType>,
    pub scope: Option<Scope>,
    pub installer_switches: Option<InstallerSwitches>,
    pub upgrade_behavior: Option<UpgradeBehavior>,
    pub package_family_name: Option<String>,
    pub commands: Option<Vec<String>>,
    pub protocols: Option<Vec<String>>,
    pub file_extensions: Option<Vec<String>>,
    pub installer_success_codes: Option<Vec<i64>>,
    pub install_modes: Option<Vec<InstallMode>>,
    pub manifest_version: Option<String>,
}

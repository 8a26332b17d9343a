use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;
use crate::arp::AppsAndFeaturesEntry;
use crate::installer_type::{InstallerType, NestedInstallerType};
use crate::kinds::{Platform, Scope, UpgradeBehavior};
use crate::switches::InstallerSwitches;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NestedInstallerFile {
    pub relative_file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portable_command_alias: Option<String>,
}

/// One installable artifact for a single architecture, locale and scope.
///
/// Fields left as `None` inherit the value declared at manifest level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Installer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_os_version: Option<String>,
    pub architecture: Architecture,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_type: Option<InstallerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_installer_type: Option<NestedInstallerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_installer_files: Option<Vec<NestedInstallerFile>>,
    pub installer_url: String,
    pub installer_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_switches: Option<InstallerSwitches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_behavior: Option<UpgradeBehavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps_and_features_entries: Option<Vec<AppsAndFeaturesEntry>>,
}

impl Installer {
    pub fn new(
        architecture: Architecture,
        installer_url: impl Into<String>,
        installer_sha256: impl Into<String>,
    ) -> Self {
        Self {
            installer_locale: None,
            platform: None,
            minimum_os_version: None,
            architecture,
            installer_type: None,
            nested_installer_type: None,
            nested_installer_files: None,
            installer_url: installer_url.into(),
            installer_sha256: installer_sha256.into(),
            signature_sha256: None,
            scope: None,
            package_family_name: None,
            installer_switches: None,
            upgrade_behavior: None,
            product_code: None,
            release_date: None,
            apps_and_features_entries: None,
        }
    }
}

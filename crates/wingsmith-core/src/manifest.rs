use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::arp::AppsAndFeaturesEntry;
use crate::installer::{Installer, NestedInstallerFile};
use crate::installer_type::{InstallerType, NestedInstallerType};
use crate::kinds::{InstallMode, Platform, Scope, UpgradeBehavior};
use crate::switches::InstallerSwitches;
use crate::validate::{
    validate_file_extensions, validate_package_identifier, validate_package_version,
    validate_protocols, validate_release_date, validate_sha256,
};

pub const INSTALLER_MANIFEST_TYPE: &str = "installer";
pub const DEFAULT_MANIFEST_VERSION: &str = "1.6.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerManifest {
    pub package_identifier: String,
    pub package_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Vec<Platform>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_type: Option<InstallerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_installer_type: Option<NestedInstallerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_installer_files: Option<Vec<NestedInstallerFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_modes: Option<Vec<InstallMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_switches: Option<InstallerSwitches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer_success_codes: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_behavior: Option<UpgradeBehavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps_and_features_entries: Option<Vec<AppsAndFeaturesEntry>>,
    #[serde(default)]
    pub installers: Vec<Installer>,
    #[serde(default = "installer_manifest_type")]
    pub manifest_type: String,
    #[serde(default = "default_manifest_version")]
    pub manifest_version: String,
}

impl InstallerManifest {
    pub fn new(package_identifier: impl Into<String>, package_version: impl Into<String>) -> Self {
        Self {
            package_identifier: package_identifier.into(),
            package_version: package_version.into(),
            installer_locale: None,
            platform: None,
            minimum_os_version: None,
            installer_type: None,
            nested_installer_type: None,
            nested_installer_files: None,
            scope: None,
            install_modes: None,
            installer_switches: None,
            installer_success_codes: None,
            upgrade_behavior: None,
            commands: None,
            protocols: None,
            file_extensions: None,
            package_family_name: None,
            product_code: None,
            release_date: None,
            apps_and_features_entries: None,
            installers: Vec::new(),
            manifest_type: installer_manifest_type(),
            manifest_version: default_manifest_version(),
        }
    }

    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self =
            toml::from_str(input).context("failed to parse installer manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).with_context(|| {
            format!(
                "failed to serialize installer manifest '{}' {}",
                self.package_identifier, self.package_version
            )
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.manifest_type != INSTALLER_MANIFEST_TYPE {
            return Err(anyhow!(
                "unexpected manifest type '{}'; expected '{INSTALLER_MANIFEST_TYPE}'",
                self.manifest_type
            ));
        }
        validate_package_identifier(&self.package_identifier)?;
        validate_package_version(&self.package_version)?;
        if let Some(file_extensions) = &self.file_extensions {
            validate_file_extensions(file_extensions)?;
        }
        if let Some(protocols) = &self.protocols {
            validate_protocols(protocols)?;
        }
        if let Some(release_date) = &self.release_date {
            validate_release_date(release_date)?;
        }
        for (index, installer) in self.installers.iter().enumerate() {
            validate_sha256(&installer.installer_sha256).with_context(|| {
                format!(
                    "invalid installer sha256 for installer #{} ({})",
                    index + 1,
                    installer.installer_url
                )
            })?;
            if let Some(release_date) = &installer.release_date {
                validate_release_date(release_date).with_context(|| {
                    format!("invalid release date for installer #{}", index + 1)
                })?;
            }
        }
        Ok(())
    }
}

/// Package identity recorded in the default-locale manifest of a release.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultLocale {
    pub package_name: Option<String>,
    pub publisher: Option<String>,
}

impl DefaultLocale {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        toml::from_str(input).context("failed to parse default locale manifest")
    }
}

/// A previously published release, used only as a fallback source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousManifest {
    pub installer: InstallerManifest,
    pub default_locale: Option<DefaultLocale>,
}

impl PreviousManifest {
    pub fn installer_at(&self, position: usize) -> Option<&Installer> {
        self.installer.installers.get(position)
    }
}

fn installer_manifest_type() -> String {
    INSTALLER_MANIFEST_TYPE.to_string()
}

fn default_manifest_version() -> String {
    DEFAULT_MANIFEST_VERSION.to_string()
}

//! Facts reported by installer inspection.
//!
//! These are produced outside this workspace (by whatever reads MSI tables,
//! MSIX manifests or archive listings) and handed over as plain values.

use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;
use crate::installer::NestedInstallerFile;
use crate::installer_type::{InstallerType, NestedInstallerType};
use crate::kinds::Platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MsiFacts {
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub manufacturer: Option<String>,
    pub upgrade_code: Option<String>,
    pub product_language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MsixFacts {
    pub target_device_family: Option<Platform>,
    pub min_version: Option<String>,
    pub package_family_name: Option<String>,
    pub signature_sha256: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundlePackage {
    pub processor_architecture: Option<Architecture>,
    pub target_device_family: Option<Vec<Platform>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MsixBundleFacts {
    pub package_family_name: Option<String>,
    pub signature_sha256: Option<String>,
    #[serde(default)]
    pub packages: Vec<BundlePackage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveFacts {
    pub nested_installer_type: Option<NestedInstallerType>,
    #[serde(default)]
    pub nested_installer_files: Vec<NestedInstallerFile>,
}

/// Data attached to the hosting release, e.g. a published checksum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseFacts {
    pub sha256: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerDetection {
    pub installer_url: String,
    pub installer_sha256: String,
    pub installer_type: Option<InstallerType>,
    pub architecture: Option<Architecture>,
    pub msi: Option<MsiFacts>,
    pub msix: Option<MsixFacts>,
    pub msix_bundle: Option<MsixBundleFacts>,
    pub archive: Option<ArchiveFacts>,
    pub release: Option<ReleaseFacts>,
}

impl InstallerDetection {
    pub fn new(installer_url: impl Into<String>, installer_sha256: impl Into<String>) -> Self {
        Self {
            installer_url: installer_url.into(),
            installer_sha256: installer_sha256.into(),
            installer_type: None,
            architecture: None,
            msi: None,
            msix: None,
            msix_bundle: None,
            archive: None,
            release: None,
        }
    }
}

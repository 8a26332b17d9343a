mod architecture;
mod arp;
mod detection;
mod installer;
mod installer_type;
mod kinds;
mod manifest;
mod switches;
pub mod validate;

pub use architecture::Architecture;
pub use arp::AppsAndFeaturesEntry;
pub use detection::{
    ArchiveFacts, BundlePackage, InstallerDetection, MsiFacts, MsixBundleFacts, MsixFacts,
    ReleaseFacts,
};
pub use installer::{Installer, NestedInstallerFile};
pub use installer_type::{InstallerType, NestedInstallerType};
pub use kinds::{InstallMode, Platform, Scope, UpgradeBehavior};
pub use manifest::{
    DefaultLocale, InstallerManifest, PreviousManifest, DEFAULT_MANIFEST_VERSION,
    INSTALLER_MANIFEST_TYPE,
};
pub use switches::InstallerSwitches;

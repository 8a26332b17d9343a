use wingsmith_core::{
    AppsAndFeaturesEntry, Architecture, InstallMode, InstallerSwitches, InstallerType,
    NestedInstallerType, Platform, Scope, UpgradeBehavior,
};

/// Minimum OS version reported by installer inspection when the package
/// declares none. Treated as unset.
pub const UNSET_MINIMUM_OS_VERSION: &str = "10.0.0.0";

/// Whether a candidate value counts as provided.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for InstallerSwitches {
    fn is_present(&self) -> bool {
        !self.are_all_blank()
    }
}

impl Presence for AppsAndFeaturesEntry {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! always_present {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Presence for $ty {
                fn is_present(&self) -> bool {
                    true
                }
            }
        )*
    };
}

always_present!(
    Architecture,
    InstallerType,
    NestedInstallerType,
    Scope,
    UpgradeBehavior,
    Platform,
    InstallMode,
    i64,
);

/// First present candidate, in the order given.
pub fn first_present<T, I>(candidates: I) -> Option<T>
where
    T: Presence,
    I: IntoIterator<Item = Option<T>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(Presence::is_present)
}

pub fn resolve<T: Presence>(
    explicit: Option<T>,
    detected: Option<T>,
    previous_installer: Option<T>,
    previous_manifest: Option<T>,
) -> Option<T> {
    first_present([explicit, detected, previous_installer, previous_manifest])
}

/// Like [`resolve`], but drops the winner when it is a placeholder.
pub fn resolve_unless<T, P>(
    explicit: Option<T>,
    detected: Option<T>,
    previous_installer: Option<T>,
    previous_manifest: Option<T>,
    suppress_if: P,
) -> Option<T>
where
    T: Presence,
    P: Fn(&T) -> bool,
{
    resolve(explicit, detected, previous_installer, previous_manifest)
        .filter(|value| !suppress_if(value))
}

pub fn is_unset_minimum_os_version(version: &String) -> bool {
    version.trim() == UNSET_MINIMUM_OS_VERSION
}

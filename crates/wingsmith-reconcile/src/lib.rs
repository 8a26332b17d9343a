mod aggregate;
mod arp;
mod context;
mod input;
mod reconcile;
mod resolve;
mod session;
mod sort;
mod update_state;

pub use aggregate::build_installer_manifest;
pub use arp::fill_arp_entry;
pub use context::BuildContext;
pub use input::{AdditionalMetadata, InstallerInput, InstallerRequest, ManifestInput};
pub use reconcile::reconcile_installer;
pub use resolve::{
    first_present, is_unset_minimum_os_version, resolve, resolve_unless, Presence,
    UNSET_MINIMUM_OS_VERSION,
};
pub use session::ManifestSession;
pub use sort::{compare_installers, sort_installers};
pub use update_state::{classify_update_state, UpdateState};

#[cfg(test)]
mod tests;

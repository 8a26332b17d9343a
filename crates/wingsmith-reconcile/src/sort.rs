use std::cmp::Ordering;

use wingsmith_core::Installer;

pub fn compare_installers(left: &Installer, right: &Installer) -> Ordering {
    left.architecture
        .cmp(&right.architecture)
        .then_with(|| left.installer_type.cmp(&right.installer_type))
        .then_with(|| left.scope.cmp(&right.scope))
        .then_with(|| left.installer_locale.cmp(&right.installer_locale))
        .then_with(|| left.installer_url.cmp(&right.installer_url))
}

/// Stable sort, so installers equal on every key keep their input order.
pub fn sort_installers(installers: &mut [Installer]) {
    installers.sort_by(compare_installers);
}

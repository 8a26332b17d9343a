use std::fmt::Debug;

use tracing::debug;
use wingsmith_core::{
    Installer, InstallerManifest, PreviousManifest, DEFAULT_MANIFEST_VERSION,
    INSTALLER_MANIFEST_TYPE,
};

use crate::context::BuildContext;
use crate::input::ManifestInput;
use crate::reconcile::rewrite_nested_installer_files;
use crate::resolve::{first_present, is_unset_minimum_os_version, Presence};
use crate::sort::sort_installers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Promotion {
    Promote,
    KeepOnInstallers,
}

#[derive(Debug, PartialEq, Eq)]
enum Distinct<T> {
    Empty,
    Single(Option<T>),
    Many,
}

fn distinct_values<T, F>(installers: &mut [Installer], field: &F) -> Distinct<T>
where
    T: PartialEq + Clone,
    F: Fn(&mut Installer) -> &mut Option<T>,
{
    let mut seen: Vec<Option<T>> = Vec::new();
    for installer in installers.iter_mut() {
        let value = field(installer).clone();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }

    match seen.len() {
        0 => Distinct::Empty,
        1 => Distinct::Single(seen.remove(0)),
        _ => Distinct::Many,
    }
}

/// Decides where a shared field lives.
///
/// Returns the manifest-level value before any previous-manifest fallback.
/// Installers lose the field when the manifest level carries the same value.
/// A blank explicit value counts as not given.
fn factor<T, F>(
    installers: &mut [Installer],
    name: &'static str,
    explicit: Option<T>,
    promotion: Promotion,
    field: F,
) -> Option<T>
where
    T: PartialEq + Clone + Debug + Presence,
    F: Fn(&mut Installer) -> &mut Option<T>,
{
    if let Some(explicit) = explicit.filter(Presence::is_present) {
        for installer in installers.iter_mut() {
            let value = field(installer);
            if value.as_ref() == Some(&explicit) {
                *value = None;
            }
        }
        debug!(field = name, value = ?explicit, "using explicit manifest-level value");
        return Some(explicit);
    }

    match distinct_values(installers, &field) {
        Distinct::Single(value) if promotion == Promotion::Promote => {
            for installer in installers.iter_mut() {
                *field(installer) = None;
            }
            debug!(field = name, value = ?value, "installers agree; promoted to manifest level");
            value
        }
        Distinct::Single(_) => {
            debug!(field = name, "installers agree; kept per installer");
            None
        }
        Distinct::Many => {
            debug!(field = name, "installers disagree; kept per installer");
            None
        }
        Distinct::Empty => None,
    }
}

fn present<T: Presence>(value: Option<T>) -> Option<T> {
    value.filter(Presence::is_present)
}

/// Assembles the manifest from reconciled installers.
///
/// Shared fields on which every installer agrees move up to the manifest and
/// are cleared from the installers. Product code and release date always stay
/// per installer.
pub fn build_installer_manifest(
    context: &BuildContext,
    input: &ManifestInput,
    installers: Vec<Installer>,
    previous: Option<&PreviousManifest>,
) -> InstallerManifest {
    let mut installers = installers;
    let previous = previous.map(|p| &p.installer);

    let installer_locale = present(factor(
        &mut installers,
        "installer_locale",
        input.installer_locale.clone(),
        Promotion::Promote,
        |i| &mut i.installer_locale,
    ))
    .or_else(|| previous.and_then(|p| p.installer_locale.clone()));
    let platform = factor(
        &mut installers,
        "platform",
        input.platform.clone(),
        Promotion::Promote,
        |i| &mut i.platform,
    )
    .or_else(|| previous.and_then(|p| p.platform.clone()));
    let minimum_os_version = present(factor(
        &mut installers,
        "minimum_os_version",
        input
            .minimum_os_version
            .clone()
            .filter(|version| !is_unset_minimum_os_version(version)),
        Promotion::Promote,
        |i| &mut i.minimum_os_version,
    ));
    let installer_type = factor(
        &mut installers,
        "installer_type",
        input.installer_type,
        Promotion::Promote,
        |i| &mut i.installer_type,
    )
    .or_else(|| previous.and_then(|p| p.installer_type));
    let nested_installer_type = factor(
        &mut installers,
        "nested_installer_type",
        None,
        Promotion::Promote,
        |i| &mut i.nested_installer_type,
    )
    .or_else(|| previous.and_then(|p| p.nested_installer_type));
    let nested_installer_files = factor(
        &mut installers,
        "nested_installer_files",
        None,
        Promotion::Promote,
        |i| &mut i.nested_installer_files,
    )
    .or_else(|| {
        previous
            .and_then(|p| p.nested_installer_files.clone())
            .map(|files| rewrite_nested_installer_files(context, files))
    });
    let scope = factor(
        &mut installers,
        "scope",
        input.scope,
        Promotion::Promote,
        |i| &mut i.scope,
    )
    .or_else(|| previous.and_then(|p| p.scope));
    let package_family_name = factor(
        &mut installers,
        "package_family_name",
        input.package_family_name.clone(),
        Promotion::Promote,
        |i| &mut i.package_family_name,
    )
    .or_else(|| previous.and_then(|p| p.package_family_name.clone()));
    let product_code = factor(
        &mut installers,
        "product_code",
        None,
        Promotion::KeepOnInstallers,
        |i| &mut i.product_code,
    );
    let installer_switches = factor(
        &mut installers,
        "installer_switches",
        input.installer_switches.clone(),
        Promotion::Promote,
        |i| &mut i.installer_switches,
    )
    .or_else(|| previous.and_then(|p| p.installer_switches.clone()));
    let upgrade_behavior = factor(
        &mut installers,
        "upgrade_behavior",
        input.upgrade_behavior,
        Promotion::Promote,
        |i| &mut i.upgrade_behavior,
    )
    .or_else(|| previous.and_then(|p| p.upgrade_behavior));
    let release_date = factor(
        &mut installers,
        "release_date",
        None,
        Promotion::KeepOnInstallers,
        |i| &mut i.release_date,
    );
    let apps_and_features_entries = factor(
        &mut installers,
        "apps_and_features_entries",
        None,
        Promotion::Promote,
        |i| &mut i.apps_and_features_entries,
    );

    sort_installers(&mut installers);

    InstallerManifest {
        package_identifier: context.package_identifier.clone(),
        package_version: context.package_version.clone(),
        installer_locale,
        platform,
        minimum_os_version,
        installer_type,
        nested_installer_type,
        nested_installer_files,
        scope,
        install_modes: first_present([
            input.install_modes.clone(),
            previous.and_then(|p| p.install_modes.clone()),
        ]),
        installer_switches,
        installer_success_codes: first_present([
            input.installer_success_codes.clone(),
            previous.and_then(|p| p.installer_success_codes.clone()),
        ]),
        upgrade_behavior,
        commands: first_present([
            input.commands.clone(),
            previous.and_then(|p| p.commands.clone()),
        ]),
        protocols: first_present([
            input.protocols.clone(),
            previous.and_then(|p| p.protocols.clone()),
        ]),
        file_extensions: first_present([
            input.file_extensions.clone(),
            previous.and_then(|p| p.file_extensions.clone()),
        ]),
        package_family_name,
        product_code,
        release_date,
        apps_and_features_entries,
        installers,
        manifest_type: INSTALLER_MANIFEST_TYPE.to_string(),
        manifest_version: input
            .manifest_version
            .clone()
            .unwrap_or_else(|| DEFAULT_MANIFEST_VERSION.to_string()),
    }
}

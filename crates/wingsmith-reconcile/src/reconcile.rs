use tracing::debug;
use wingsmith_core::{
    AppsAndFeaturesEntry, Architecture, Installer, NestedInstallerFile, PreviousManifest,
};

use crate::arp::fill_arp_entry;
use crate::context::BuildContext;
use crate::input::InstallerRequest;
use crate::resolve::{first_present, is_unset_minimum_os_version, resolve, resolve_unless};

/// Rolls carried-over nested paths forward and makes them relative.
pub(crate) fn rewrite_nested_installer_files(
    context: &BuildContext,
    files: Vec<NestedInstallerFile>,
) -> Vec<NestedInstallerFile> {
    files
        .into_iter()
        .map(|file| NestedInstallerFile {
            relative_file_path: context
                .substitute(&file.relative_file_path)
                .trim_start_matches(|ch: char| matches!(ch, '/' | '\\' | '.'))
                .to_string(),
            ..file
        })
        .collect()
}

/// Builds the installer record(s) for one detected artifact.
///
/// `position` is the number of installers already accumulated; the previous
/// manifest's installer at that index is the per-installer fallback. Every
/// record produced is handed to `on_add`: one for a plain installer, one per
/// architecture-bearing package for a bundle.
pub fn reconcile_installer<F>(
    context: &BuildContext,
    request: &InstallerRequest,
    previous: Option<&PreviousManifest>,
    position: usize,
    mut on_add: F,
) where
    F: FnMut(Installer),
{
    let detection = &request.detection;
    let input = &request.input;
    let additional = request.additional_metadata.as_ref();
    let previous_manifest = previous.map(|p| &p.installer);
    let previous_installer = previous.and_then(|p| p.installer_at(position));
    let previous_defaults = previous.and_then(|p| p.default_locale.as_ref());
    let msi = detection.msi.as_ref();
    let msix = detection.msix.as_ref();
    let bundle = detection.msix_bundle.as_ref();
    let archive = detection.archive.as_ref();
    let release = detection.release.as_ref();

    let nested_installer_files = resolve(
        None,
        archive.map(|a| a.nested_installer_files.clone()),
        previous_installer.and_then(|p| p.nested_installer_files.clone()),
        previous_manifest.and_then(|p| p.nested_installer_files.clone()),
    )
    .map(|files| rewrite_nested_installer_files(context, files));

    let product_code = first_present([
        input.product_code.clone(),
        additional.and_then(|a| a.product_code.clone()),
        msi.and_then(|m| m.product_code.clone()),
    ])
    .or_else(|| {
        first_present([
            previous_installer.and_then(|p| p.product_code.clone()),
            previous_manifest.and_then(|p| p.product_code.clone()),
        ])
        .map(|code| context.substitute(&code))
    });

    let fill = |entry: &AppsAndFeaturesEntry| {
        fill_arp_entry(entry, context, msi, previous_defaults, additional)
    };
    let apps_and_features_entries = match additional
        .and_then(|a| a.apps_and_features_entry.clone())
    {
        Some(entry) => Some(vec![entry]),
        None => first_present([
            previous_installer.and_then(|p| p.apps_and_features_entries.clone()),
            previous_manifest.and_then(|p| p.apps_and_features_entries.clone()),
        ])
        .map(|entries| entries.iter().map(fill).collect())
        .or_else(|| {
            let fresh = fill(&AppsAndFeaturesEntry::default());
            (!fresh.is_empty()).then(|| vec![fresh])
        }),
    };

    let installer = Installer {
        installer_locale: resolve(
            input.installer_locale.clone(),
            msi.and_then(|m| m.product_language.clone()),
            previous_installer.and_then(|p| p.installer_locale.clone()),
            None,
        ),
        platform: resolve(
            None,
            msix.and_then(|m| m.target_device_family).map(|p| vec![p]),
            previous_installer.and_then(|p| p.platform.clone()),
            previous_manifest.and_then(|p| p.platform.clone()),
        ),
        minimum_os_version: resolve_unless(
            None,
            msix.and_then(|m| m.min_version.clone()),
            previous_installer.and_then(|p| p.minimum_os_version.clone()),
            previous_manifest.and_then(|p| p.minimum_os_version.clone()),
            is_unset_minimum_os_version,
        ),
        architecture: first_present([
            input.architecture,
            detection.architecture,
            previous_installer.map(|p| p.architecture),
        ])
        .unwrap_or(Architecture::Neutral),
        installer_type: resolve(
            input.installer_type,
            detection.installer_type,
            previous_installer.and_then(|p| p.installer_type),
            previous_manifest.and_then(|p| p.installer_type),
        ),
        nested_installer_type: resolve(
            None,
            archive.and_then(|a| a.nested_installer_type),
            previous_installer.and_then(|p| p.nested_installer_type),
            previous_manifest.and_then(|p| p.nested_installer_type),
        ),
        nested_installer_files,
        installer_url: detection.installer_url.clone(),
        installer_sha256: first_present([
            release.and_then(|r| r.sha256.clone()),
            Some(detection.installer_sha256.clone()),
        ])
        .unwrap_or_default()
        .to_ascii_uppercase(),
        signature_sha256: first_present([
            msix.and_then(|m| m.signature_sha256.clone()),
            bundle.and_then(|b| b.signature_sha256.clone()),
        ])
        .map(|sha| sha.to_ascii_uppercase()),
        scope: resolve(
            input.scope,
            None,
            previous_installer.and_then(|p| p.scope),
            previous_manifest.and_then(|p| p.scope),
        ),
        package_family_name: first_present([
            msix.and_then(|m| m.package_family_name.clone()),
            bundle.and_then(|b| b.package_family_name.clone()),
            previous_installer.and_then(|p| p.package_family_name.clone()),
            previous_manifest.and_then(|p| p.package_family_name.clone()),
        ]),
        installer_switches: resolve(
            Some(input.installer_switches.clone()),
            None,
            previous_installer.and_then(|p| p.installer_switches.clone()),
            previous_manifest.and_then(|p| p.installer_switches.clone()),
        ),
        upgrade_behavior: resolve(
            input.upgrade_behavior,
            None,
            previous_installer.and_then(|p| p.upgrade_behavior),
            previous_manifest.and_then(|p| p.upgrade_behavior),
        ),
        product_code,
        release_date: first_present([
            additional.and_then(|a| a.release_date.clone()),
            input.release_date.clone(),
            release.and_then(|r| r.release_date.clone()),
        ]),
        apps_and_features_entries,
    };

    let Some(bundle) = bundle else {
        debug!(
            position,
            architecture = installer.architecture.as_str(),
            url = %installer.installer_url,
            "reconciled installer"
        );
        on_add(installer);
        return;
    };

    for package in &bundle.packages {
        let Some(architecture) = package.processor_architecture else {
            debug!(url = %installer.installer_url, "skipping bundle package without architecture");
            continue;
        };
        debug!(
            position,
            architecture = architecture.as_str(),
            url = %installer.installer_url,
            "reconciled bundle package"
        );
        on_add(Installer {
            architecture,
            platform: package.target_device_family.clone(),
            ..installer.clone()
        });
    }
}

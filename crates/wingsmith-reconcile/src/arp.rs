use wingsmith_core::{AppsAndFeaturesEntry, DefaultLocale, MsiFacts};

use crate::context::BuildContext;
use crate::input::AdditionalMetadata;
use crate::resolve::first_present;

/// Completes an Add/Remove Programs entry for the version being built.
///
/// Display name, publisher and display version are dropped when they repeat
/// the package-level name, publisher or version.
pub fn fill_arp_entry(
    entry: &AppsAndFeaturesEntry,
    context: &BuildContext,
    msi: Option<&MsiFacts>,
    previous_defaults: Option<&DefaultLocale>,
    additional: Option<&AdditionalMetadata>,
) -> AppsAndFeaturesEntry {
    let overrides = additional.and_then(|metadata| metadata.apps_and_features_entry.as_ref());

    let display_name = first_present([
        overrides.and_then(|o| o.display_name.clone()),
        msi.and_then(|m| m.product_name.clone()),
        entry.display_name.clone(),
    ]);
    let package_name = first_present([
        context.package_name.clone(),
        previous_defaults.and_then(|d| d.package_name.clone()),
    ]);

    let publisher = first_present([
        overrides.and_then(|o| o.publisher.clone()),
        msi.and_then(|m| m.manufacturer.clone()),
        entry.publisher.clone(),
    ]);
    let package_publisher = first_present([
        context.publisher.clone(),
        previous_defaults.and_then(|d| d.publisher.clone()),
    ]);

    let display_version = first_present([
        overrides.and_then(|o| o.display_version.clone()),
        msi.and_then(|m| m.product_version.clone()),
        entry.display_version.clone(),
    ]);

    AppsAndFeaturesEntry {
        display_name: display_name
            .filter(|name| Some(name) != package_name.as_ref())
            .map(|name| context.substitute(&name)),
        publisher: publisher.filter(|value| Some(value) != package_publisher.as_ref()),
        display_version: display_version
            .filter(|version| *version != context.package_version)
            .map(|version| context.substitute(&version)),
        upgrade_code: first_present([
            overrides.and_then(|o| o.upgrade_code.clone()),
            msi.and_then(|m| m.upgrade_code.clone()),
            entry.upgrade_code.clone(),
        ]),
    }
}

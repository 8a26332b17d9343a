use anyhow::anyhow;
use wingsmith_core::{
    AppsAndFeaturesEntry, ArchiveFacts, Architecture, BundlePackage, DefaultLocale, Installer,
    InstallerDetection, InstallerManifest, InstallerSwitches, InstallerType, MsiFacts,
    MsixBundleFacts, MsixFacts, NestedInstallerFile, NestedInstallerType, Platform,
    PreviousManifest, ReleaseFacts, Scope, UpgradeBehavior, DEFAULT_MANIFEST_VERSION,
};

use super::*;

const SHA_LOWER: &str = "3f1c2d4e5b60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90a";
const SHA_UPPER: &str = "3F1C2D4E5B60718293A4B5C6D7E8F90A1B2C3D4E5F60718293A4B5C6D7E8F90A";

fn detection(url: &str) -> InstallerDetection {
    InstallerDetection::new(url, SHA_LOWER)
}

fn reconcile_one(
    context: &BuildContext,
    request: &InstallerRequest,
    previous: Option<&PreviousManifest>,
) -> Installer {
    let mut produced = Vec::new();
    reconcile_installer(context, request, previous, 0, |installer| produced.push(installer));
    assert_eq!(produced.len(), 1, "expected exactly one installer");
    produced.remove(0)
}

fn installer(architecture: Architecture, url: &str) -> Installer {
    Installer::new(architecture, url, SHA_UPPER)
}

fn previous_manifest(installers: Vec<Installer>) -> PreviousManifest {
    let mut manifest = InstallerManifest::new("Contoso.Widget", "1.0.0");
    manifest.installers = installers;
    PreviousManifest {
        installer: manifest,
        default_locale: None,
    }
}

fn switches(silent: &str) -> InstallerSwitches {
    InstallerSwitches {
        silent: Some(silent.to_string()),
        ..InstallerSwitches::default()
    }
}

#[test]
fn resolve_returns_first_present_candidate() {
    assert_eq!(
        resolve(None, None, None, Some("X".to_string())),
        Some("X".to_string())
    );
    assert_eq!(
        resolve(
            Some("A".to_string()),
            Some("B".to_string()),
            Some("C".to_string()),
            Some("D".to_string())
        ),
        Some("A".to_string())
    );
    assert_eq!(
        resolve(None, Some("B".to_string()), Some("C".to_string()), None),
        Some("B".to_string())
    );
    assert_eq!(resolve::<String>(None, None, None, None), None);
}

#[test]
fn resolve_skips_blank_and_empty_candidates() {
    assert_eq!(
        resolve(
            Some("  ".to_string()),
            None,
            Some("C".to_string()),
            None
        ),
        Some("C".to_string())
    );
    assert_eq!(
        resolve(Some(Vec::<String>::new()), Some(vec!["b".to_string()]), None, None),
        Some(vec!["b".to_string()])
    );
    assert_eq!(
        resolve(
            Some(InstallerSwitches::default()),
            None,
            Some(switches("/S")),
            None
        ),
        Some(switches("/S"))
    );
}

#[test]
fn resolve_unless_drops_placeholder_winner() {
    assert_eq!(
        resolve_unless(
            None,
            Some(UNSET_MINIMUM_OS_VERSION.to_string()),
            Some("10.0.17763.0".to_string()),
            None,
            is_unset_minimum_os_version,
        ),
        None
    );
    assert_eq!(
        resolve_unless(
            None,
            Some("10.0.17763.0".to_string()),
            None,
            None,
            is_unset_minimum_os_version,
        ),
        Some("10.0.17763.0".to_string())
    );
}

#[test]
fn first_present_accepts_any_number_of_candidates() {
    assert_eq!(
        first_present([None, None, None, None, Some(Scope::User), Some(Scope::Machine)]),
        Some(Scope::User)
    );
    assert_eq!(first_present(Vec::<Option<Scope>>::new()), None);
}

#[test]
fn reconcile_falls_back_to_previous_release() {
    let mut previous_installer = installer(Architecture::X64, "https://example.test/widget-1.0.0.exe");
    previous_installer.installer_type = Some(InstallerType::Nullsoft);
    previous_installer.product_code = Some("Widget 1.0.0".to_string());
    previous_installer.installer_switches = Some(switches("/S"));
    let mut previous = previous_manifest(vec![previous_installer]);
    previous.installer.scope = Some(Scope::Machine);
    previous.installer.upgrade_behavior = Some(UpgradeBehavior::Install);
    previous.installer.minimum_os_version = Some(UNSET_MINIMUM_OS_VERSION.to_string());

    let context = BuildContext::new("Contoso.Widget", "2.0.0").with_known_versions(["1.0.0"]);
    let request = InstallerRequest::new(detection("https://example.test/widget-2.0.0.exe"));

    let installer = reconcile_one(&context, &request, Some(&previous));
    assert_eq!(installer.architecture, Architecture::X64);
    assert_eq!(installer.installer_type, Some(InstallerType::Nullsoft));
    assert_eq!(installer.scope, Some(Scope::Machine));
    assert_eq!(installer.upgrade_behavior, Some(UpgradeBehavior::Install));
    assert_eq!(installer.minimum_os_version, None);
    assert_eq!(installer.product_code.as_deref(), Some("Widget 2.0.0"));
    assert_eq!(installer.installer_switches, Some(switches("/S")));
    assert_eq!(installer.installer_url, "https://example.test/widget-2.0.0.exe");
    assert_eq!(installer.installer_sha256, SHA_UPPER);
    assert_eq!(installer.apps_and_features_entries, None);
}

#[test]
fn reconcile_prefers_explicit_over_detected_over_previous() {
    let mut previous_installer = installer(Architecture::X86, "https://example.test/old.exe");
    previous_installer.installer_type = Some(InstallerType::Inno);
    previous_installer.scope = Some(Scope::Machine);
    previous_installer.installer_switches = Some(switches("/VERYSILENT"));
    let previous = previous_manifest(vec![previous_installer]);

    let mut request = InstallerRequest::new(InstallerDetection {
        architecture: Some(Architecture::X64),
        installer_type: Some(InstallerType::Msi),
        ..detection("https://example.test/new.msi")
    });
    request.input.architecture = Some(Architecture::Arm64);
    request.input.installer_type = Some(InstallerType::Exe);
    request.input.scope = Some(Scope::User);
    request.input.installer_switches.silent = Some(" ".to_string());

    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installer = reconcile_one(&context, &request, Some(&previous));
    assert_eq!(installer.architecture, Architecture::Arm64);
    assert_eq!(installer.installer_type, Some(InstallerType::Exe));
    assert_eq!(installer.scope, Some(Scope::User));
    assert_eq!(installer.installer_switches, Some(switches("/VERYSILENT")));
}

#[test]
fn reconcile_never_fabricates_values() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let request = InstallerRequest::new(detection("https://example.test/widget.exe"));

    let installer = reconcile_one(&context, &request, None);
    let expected = Installer::new(
        Architecture::Neutral,
        "https://example.test/widget.exe",
        SHA_UPPER,
    );
    assert_eq!(installer, expected);
}

#[test]
fn reconcile_uses_detected_msix_facts() {
    let request = InstallerRequest::new(InstallerDetection {
        installer_type: Some(InstallerType::Msix),
        msix: Some(MsixFacts {
            target_device_family: Some(Platform::WindowsUniversal),
            min_version: Some("10.0.17763.0".to_string()),
            package_family_name: Some("Contoso.Widget_8wekyb3d8bbwe".to_string()),
            signature_sha256: Some("abcd".to_string()),
        }),
        ..detection("https://example.test/widget.msix")
    });
    let mut previous_installer = installer(Architecture::X64, "https://example.test/old.msix");
    previous_installer.platform = Some(vec![Platform::WindowsDesktop]);
    previous_installer.package_family_name = Some("Contoso.Old_1".to_string());
    let previous = previous_manifest(vec![previous_installer]);

    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installer = reconcile_one(&context, &request, Some(&previous));
    assert_eq!(installer.platform, Some(vec![Platform::WindowsUniversal]));
    assert_eq!(installer.minimum_os_version.as_deref(), Some("10.0.17763.0"));
    assert_eq!(
        installer.package_family_name.as_deref(),
        Some("Contoso.Widget_8wekyb3d8bbwe")
    );
    assert_eq!(installer.signature_sha256.as_deref(), Some("ABCD"));
}

#[test]
fn reconcile_suppresses_placeholder_minimum_os_version_from_detection() {
    let request = InstallerRequest::new(InstallerDetection {
        msix: Some(MsixFacts {
            min_version: Some(UNSET_MINIMUM_OS_VERSION.to_string()),
            ..MsixFacts::default()
        }),
        ..detection("https://example.test/widget.msix")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.minimum_os_version, None);
}

#[test]
fn reconcile_rewrites_nested_installer_paths() {
    let request = InstallerRequest::new(InstallerDetection {
        installer_type: Some(InstallerType::Zip),
        archive: Some(ArchiveFacts {
            nested_installer_type: Some(NestedInstallerType::Portable),
            nested_installer_files: vec![NestedInstallerFile {
                relative_file_path: "./widget-1.0.0/widget.exe".to_string(),
                portable_command_alias: Some("widget".to_string()),
            }],
        }),
        ..detection("https://example.test/widget-1.1.0.zip")
    });
    let context = BuildContext::new("Contoso.Widget", "1.1.0").with_known_versions(["1.0.0"]);

    let installer = reconcile_one(&context, &request, None);
    assert_eq!(
        installer.nested_installer_type,
        Some(NestedInstallerType::Portable)
    );
    assert_eq!(
        installer.nested_installer_files,
        Some(vec![NestedInstallerFile {
            relative_file_path: "widget-1.1.0/widget.exe".to_string(),
            portable_command_alias: Some("widget".to_string()),
        }])
    );
}

#[test]
fn reconcile_takes_nested_files_from_previous_when_archive_lists_none() {
    let mut previous_installer = installer(Architecture::X64, "https://example.test/tool-1.0.0.zip");
    previous_installer.nested_installer_type = Some(NestedInstallerType::Exe);
    previous_installer.nested_installer_files = Some(vec![NestedInstallerFile {
        relative_file_path: "\\tool-1.0.0\\tool.exe".to_string(),
        portable_command_alias: None,
    }]);
    let previous = previous_manifest(vec![previous_installer]);
    let request = InstallerRequest::new(InstallerDetection {
        archive: Some(ArchiveFacts::default()),
        ..detection("https://example.test/tool-1.1.0.zip")
    });
    let context = BuildContext::new("Contoso.Tool", "1.1.0").with_known_versions(["1.0.0"]);

    let installer = reconcile_one(&context, &request, Some(&previous));
    assert_eq!(installer.nested_installer_type, Some(NestedInstallerType::Exe));
    assert_eq!(
        installer.nested_installer_files,
        Some(vec![NestedInstallerFile {
            relative_file_path: "tool-1.1.0\\tool.exe".to_string(),
            portable_command_alias: None,
        }])
    );
}

#[test]
fn reconcile_prefers_release_checksum_and_orders_release_dates() {
    let mut request = InstallerRequest::new(InstallerDetection {
        release: Some(ReleaseFacts {
            sha256: Some("feed".to_string()),
            release_date: Some("2024-01-03".to_string()),
        }),
        ..detection("https://example.test/widget.exe")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.installer_sha256, "FEED");
    assert_eq!(installer.release_date.as_deref(), Some("2024-01-03"));

    request.input.release_date = Some("2024-01-02".to_string());
    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.release_date.as_deref(), Some("2024-01-02"));

    request.additional_metadata = Some(AdditionalMetadata {
        release_date: Some("2024-01-01".to_string()),
        ..AdditionalMetadata::default()
    });
    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.release_date.as_deref(), Some("2024-01-01"));
}

#[test]
fn reconcile_orders_product_code_sources() {
    let mut previous_installer = installer(Architecture::X64, "https://example.test/old.msi");
    previous_installer.product_code = Some("{OLD}".to_string());
    let previous = previous_manifest(vec![previous_installer]);
    let mut request = InstallerRequest::new(InstallerDetection {
        msi: Some(MsiFacts {
            product_code: Some("{MSI}".to_string()),
            ..MsiFacts::default()
        }),
        ..detection("https://example.test/new.msi")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    assert_eq!(
        reconcile_one(&context, &request, Some(&previous)).product_code.as_deref(),
        Some("{MSI}")
    );

    request.additional_metadata = Some(AdditionalMetadata {
        product_code: Some("{ADDITIONAL}".to_string()),
        ..AdditionalMetadata::default()
    });
    assert_eq!(
        reconcile_one(&context, &request, Some(&previous)).product_code.as_deref(),
        Some("{ADDITIONAL}")
    );

    request.input.product_code = Some("{EXPLICIT}".to_string());
    assert_eq!(
        reconcile_one(&context, &request, Some(&previous)).product_code.as_deref(),
        Some("{EXPLICIT}")
    );

    request.input.product_code = None;
    request.additional_metadata = None;
    request.detection.msi = None;
    assert_eq!(
        reconcile_one(&context, &request, Some(&previous)).product_code.as_deref(),
        Some("{OLD}")
    );
}

#[test]
fn reconcile_fills_fresh_arp_entry_from_msi() {
    let mut request = InstallerRequest::new(InstallerDetection {
        installer_type: Some(InstallerType::Msi),
        msi: Some(MsiFacts {
            product_code: None,
            product_name: Some("Widget".to_string()),
            product_version: Some("2.0.0.0".to_string()),
            manufacturer: Some("Contoso".to_string()),
            upgrade_code: Some("{UPGRADE}".to_string()),
            product_language: Some("en-US".to_string()),
        }),
        ..detection("https://example.test/widget.msi")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0")
        .with_package_name("Widget")
        .with_publisher("Contoso Ltd.");

    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.installer_locale.as_deref(), Some("en-US"));
    assert_eq!(
        installer.apps_and_features_entries,
        Some(vec![AppsAndFeaturesEntry {
            display_name: None,
            publisher: Some("Contoso".to_string()),
            display_version: Some("2.0.0.0".to_string()),
            upgrade_code: Some("{UPGRADE}".to_string()),
        }])
    );

    request.input.installer_locale = Some("de-DE".to_string());
    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.installer_locale.as_deref(), Some("de-DE"));
}

#[test]
fn reconcile_uses_additional_arp_entry_verbatim() {
    let entry = AppsAndFeaturesEntry {
        display_name: Some("Widget".to_string()),
        ..AppsAndFeaturesEntry::default()
    };
    let mut request = InstallerRequest::new(detection("https://example.test/widget.exe"));
    request.additional_metadata = Some(AdditionalMetadata {
        apps_and_features_entry: Some(entry.clone()),
        ..AdditionalMetadata::default()
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0").with_package_name("Widget");

    let installer = reconcile_one(&context, &request, None);
    assert_eq!(installer.apps_and_features_entries, Some(vec![entry]));
}

#[test]
fn reconcile_refills_previous_arp_entries() {
    let mut previous_installer = installer(Architecture::X64, "https://example.test/widget-1.0.0.exe");
    previous_installer.apps_and_features_entries = Some(vec![AppsAndFeaturesEntry {
        display_name: Some("Widget 1.0.0".to_string()),
        publisher: Some("Contoso".to_string()),
        display_version: None,
        upgrade_code: Some("{UPGRADE}".to_string()),
    }]);
    let mut previous = previous_manifest(vec![previous_installer]);
    previous.default_locale = Some(DefaultLocale {
        package_name: Some("Widget".to_string()),
        publisher: Some("Contoso".to_string()),
    });
    let context = BuildContext::new("Contoso.Widget", "1.1.0").with_known_versions(["1.0.0"]);
    let request = InstallerRequest::new(detection("https://example.test/widget-1.1.0.exe"));

    let installer = reconcile_one(&context, &request, Some(&previous));
    assert_eq!(
        installer.apps_and_features_entries,
        Some(vec![AppsAndFeaturesEntry {
            display_name: Some("Widget 1.1.0".to_string()),
            publisher: None,
            display_version: None,
            upgrade_code: Some("{UPGRADE}".to_string()),
        }])
    );
}

#[test]
fn bundle_expands_into_one_installer_per_architecture() {
    let request = InstallerRequest::new(InstallerDetection {
        installer_type: Some(InstallerType::Msix),
        msix_bundle: Some(MsixBundleFacts {
            package_family_name: Some("Contoso.Widget_8wekyb3d8bbwe".to_string()),
            signature_sha256: Some("beef".to_string()),
            packages: vec![
                BundlePackage {
                    processor_architecture: Some(Architecture::X86),
                    target_device_family: Some(vec![Platform::WindowsDesktop]),
                },
                BundlePackage {
                    processor_architecture: None,
                    target_device_family: Some(vec![Platform::WindowsUniversal]),
                },
                BundlePackage {
                    processor_architecture: Some(Architecture::X64),
                    target_device_family: Some(vec![
                        Platform::WindowsDesktop,
                        Platform::WindowsUniversal,
                    ]),
                },
            ],
        }),
        ..detection("https://example.test/widget.msixbundle")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    let mut produced = Vec::new();
    reconcile_installer(&context, &request, None, 0, |installer| produced.push(installer));

    assert_eq!(produced.len(), 2);
    assert_eq!(produced[0].architecture, Architecture::X86);
    assert_eq!(produced[0].platform, Some(vec![Platform::WindowsDesktop]));
    assert_eq!(produced[1].architecture, Architecture::X64);
    assert_eq!(produced[0].signature_sha256.as_deref(), Some("BEEF"));
    assert_eq!(
        produced[0].package_family_name.as_deref(),
        Some("Contoso.Widget_8wekyb3d8bbwe")
    );

    let mut rebased = produced[0].clone();
    rebased.architecture = Architecture::X64;
    rebased.platform = produced[1].platform.clone();
    assert_eq!(rebased, produced[1]);
}

#[test]
fn bundle_without_architectures_produces_nothing() {
    let request = InstallerRequest::new(InstallerDetection {
        msix_bundle: Some(MsixBundleFacts {
            packages: vec![BundlePackage::default()],
            ..MsixBundleFacts::default()
        }),
        ..detection("https://example.test/widget.msixbundle")
    });
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    let mut produced = Vec::new();
    reconcile_installer(&context, &request, None, 0, |installer| produced.push(installer));
    assert!(produced.is_empty());
}

#[test]
fn arp_filler_suppresses_values_matching_package_identity() {
    let entry = AppsAndFeaturesEntry {
        display_name: Some("Widget".to_string()),
        publisher: Some("Contoso".to_string()),
        display_version: Some("1.1.0".to_string()),
        upgrade_code: Some("{UPGRADE}".to_string()),
    };
    let defaults = DefaultLocale {
        package_name: Some("Widget".to_string()),
        publisher: Some("Contoso".to_string()),
    };
    let context = BuildContext::new("Contoso.Widget", "1.1.0");

    let filled = fill_arp_entry(&entry, &context, None, Some(&defaults), None);
    assert_eq!(
        filled,
        AppsAndFeaturesEntry {
            display_name: None,
            publisher: None,
            display_version: None,
            upgrade_code: Some("{UPGRADE}".to_string()),
        }
    );
}

#[test]
fn arp_filler_prefers_context_identity_over_previous_defaults() {
    let entry = AppsAndFeaturesEntry {
        display_name: Some("Widget".to_string()),
        publisher: Some("Contoso".to_string()),
        ..AppsAndFeaturesEntry::default()
    };
    let defaults = DefaultLocale {
        package_name: Some("Widget".to_string()),
        publisher: Some("Contoso".to_string()),
    };
    let context = BuildContext::new("Contoso.Widget", "1.1.0")
        .with_package_name("Widget Pro")
        .with_publisher("Contoso Ltd.");

    let filled = fill_arp_entry(&entry, &context, None, Some(&defaults), None);
    assert_eq!(filled.display_name.as_deref(), Some("Widget"));
    assert_eq!(filled.publisher.as_deref(), Some("Contoso"));
}

#[test]
fn arp_filler_applies_overrides_before_detection() {
    let entry = AppsAndFeaturesEntry {
        display_version: Some("1.0.0".to_string()),
        upgrade_code: Some("{ENTRY}".to_string()),
        ..AppsAndFeaturesEntry::default()
    };
    let msi = MsiFacts {
        product_version: Some("1.1.0.7".to_string()),
        upgrade_code: Some("{MSI}".to_string()),
        ..MsiFacts::default()
    };
    let additional = AdditionalMetadata {
        apps_and_features_entry: Some(AppsAndFeaturesEntry {
            upgrade_code: Some("{OVERRIDE}".to_string()),
            ..AppsAndFeaturesEntry::default()
        }),
        ..AdditionalMetadata::default()
    };
    let context = BuildContext::new("Contoso.Widget", "1.1.0").with_known_versions(["1.0.0"]);

    let filled = fill_arp_entry(&entry, &context, Some(&msi), None, Some(&additional));
    assert_eq!(filled.display_version.as_deref(), Some("1.1.0.7"));
    assert_eq!(filled.upgrade_code.as_deref(), Some("{OVERRIDE}"));

    let filled = fill_arp_entry(&entry, &context, None, None, None);
    assert_eq!(filled.display_version.as_deref(), Some("1.1.0"));
    assert_eq!(filled.upgrade_code.as_deref(), Some("{ENTRY}"));
}

fn scoped(architecture: Architecture, scope: Option<Scope>) -> Installer {
    let mut installer = installer(
        architecture,
        &format!("https://example.test/widget-{}.exe", architecture.as_str()),
    );
    installer.scope = scope;
    installer
}

#[test]
fn aggregator_promotes_values_shared_by_every_installer() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installers = vec![
        scoped(Architecture::X86, Some(Scope::Machine)),
        scoped(Architecture::X64, Some(Scope::Machine)),
        scoped(Architecture::Arm64, Some(Scope::Machine)),
    ];

    let manifest = build_installer_manifest(&context, &ManifestInput::default(), installers, None);
    assert_eq!(manifest.scope, Some(Scope::Machine));
    assert_eq!(manifest.installers.len(), 3);
    assert!(manifest.installers.iter().all(|i| i.scope.is_none()));
    assert_eq!(manifest.package_identifier, "Contoso.Widget");
    assert_eq!(manifest.package_version, "2.0.0");
    assert_eq!(manifest.manifest_version, DEFAULT_MANIFEST_VERSION);
}

#[test]
fn aggregator_leaves_disagreeing_values_on_installers() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installers = vec![
        scoped(Architecture::X86, Some(Scope::Machine)),
        scoped(Architecture::X64, Some(Scope::User)),
    ];

    let manifest = build_installer_manifest(&context, &ManifestInput::default(), installers, None);
    assert_eq!(manifest.scope, None);
    assert_eq!(manifest.installers[0].scope, Some(Scope::Machine));
    assert_eq!(manifest.installers[1].scope, Some(Scope::User));
}

#[test]
fn aggregator_does_not_fill_missing_values_on_partial_agreement() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installers = vec![
        scoped(Architecture::X86, Some(Scope::Machine)),
        scoped(Architecture::X64, None),
    ];

    let manifest = build_installer_manifest(&context, &ManifestInput::default(), installers, None);
    assert_eq!(manifest.scope, None);
    assert_eq!(manifest.installers[0].scope, Some(Scope::Machine));
    assert_eq!(manifest.installers[1].scope, None);
}

#[test]
fn aggregator_keeps_product_code_and_release_date_per_installer() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installers = [Architecture::X86, Architecture::X64]
        .into_iter()
        .map(|architecture| {
            let mut installer = scoped(architecture, None);
            installer.product_code = Some("{PRODUCT}".to_string());
            installer.release_date = Some("2024-05-01".to_string());
            installer
        })
        .collect::<Vec<_>>();

    let manifest = build_installer_manifest(&context, &ManifestInput::default(), installers, None);
    assert_eq!(manifest.product_code, None);
    assert_eq!(manifest.release_date, None);
    for installer in &manifest.installers {
        assert_eq!(installer.product_code.as_deref(), Some("{PRODUCT}"));
        assert_eq!(installer.release_date.as_deref(), Some("2024-05-01"));
    }
}

#[test]
fn aggregator_lets_explicit_input_win_over_promotion() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let installers = vec![
        scoped(Architecture::X86, Some(Scope::User)),
        scoped(Architecture::X64, Some(Scope::Machine)),
    ];
    let input = ManifestInput {
        scope: Some(Scope::User),
        ..ManifestInput::default()
    };

    let manifest = build_installer_manifest(&context, &input, installers, None);
    assert_eq!(manifest.scope, Some(Scope::User));
    assert_eq!(manifest.installers[0].scope, None);
    assert_eq!(manifest.installers[1].scope, Some(Scope::Machine));
}

#[test]
fn aggregator_falls_back_to_previous_manifest_level_values() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let mut first = scoped(Architecture::X86, None);
    first.installer_locale = Some("en-US".to_string());
    let mut second = scoped(Architecture::X64, None);
    second.installer_locale = Some("de-DE".to_string());
    let mut previous = previous_manifest(Vec::new());
    previous.installer.installer_locale = Some("en-US".to_string());
    previous.installer.upgrade_behavior = Some(UpgradeBehavior::UninstallPrevious);
    previous.installer.minimum_os_version = Some("10.0.19041.0".to_string());

    let manifest = build_installer_manifest(
        &context,
        &ManifestInput::default(),
        vec![first, second],
        Some(&previous),
    );
    assert_eq!(manifest.installer_locale.as_deref(), Some("en-US"));
    assert_eq!(manifest.installers[0].installer_locale.as_deref(), Some("en-US"));
    assert_eq!(manifest.installers[1].installer_locale.as_deref(), Some("de-DE"));
    assert_eq!(
        manifest.upgrade_behavior,
        Some(UpgradeBehavior::UninstallPrevious)
    );
    assert_eq!(manifest.minimum_os_version, None);
}

#[test]
fn aggregator_rewrites_promoted_nested_installer_paths() {
    let context = BuildContext::new("Contoso.Tool", "1.1.0").with_known_versions(["1.0.0"]);
    let mut previous = previous_manifest(Vec::new());
    previous.installer.nested_installer_files = Some(vec![NestedInstallerFile {
        relative_file_path: "tool-1.0.0/tool.exe".to_string(),
        portable_command_alias: Some("tool".to_string()),
    }]);

    let manifest = build_installer_manifest(
        &context,
        &ManifestInput::default(),
        vec![scoped(Architecture::X64, None)],
        Some(&previous),
    );
    assert_eq!(
        manifest.nested_installer_files,
        Some(vec![NestedInstallerFile {
            relative_file_path: "tool-1.1.0/tool.exe".to_string(),
            portable_command_alias: Some("tool".to_string()),
        }])
    );
}

#[test]
fn aggregator_promotes_shared_arp_entries() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let entries = vec![AppsAndFeaturesEntry {
        upgrade_code: Some("{UPGRADE}".to_string()),
        ..AppsAndFeaturesEntry::default()
    }];
    let installers = [Architecture::X86, Architecture::X64]
        .into_iter()
        .map(|architecture| {
            let mut installer = scoped(architecture, None);
            installer.apps_and_features_entries = Some(entries.clone());
            installer
        })
        .collect::<Vec<_>>();

    let manifest = build_installer_manifest(&context, &ManifestInput::default(), installers, None);
    assert_eq!(manifest.apps_and_features_entries, Some(entries));
    assert!(manifest
        .installers
        .iter()
        .all(|i| i.apps_and_features_entries.is_none()));
}

#[test]
fn aggregator_resolves_list_fields_from_input_then_previous() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let mut previous = previous_manifest(Vec::new());
    previous.installer.commands = Some(vec!["widget".to_string()]);
    previous.installer.protocols = Some(vec!["old-widget".to_string()]);
    previous.installer.installer_success_codes = Some(vec![3010]);
    let input = ManifestInput {
        commands: Some(Vec::new()),
        protocols: Some(vec!["widget".to_string()]),
        manifest_version: Some("1.9.0".to_string()),
        ..ManifestInput::default()
    };

    let manifest = build_installer_manifest(
        &context,
        &input,
        vec![scoped(Architecture::X64, None)],
        Some(&previous),
    );
    assert_eq!(manifest.commands, Some(vec!["widget".to_string()]));
    assert_eq!(manifest.protocols, Some(vec!["widget".to_string()]));
    assert_eq!(manifest.installer_success_codes, Some(vec![3010]));
    assert_eq!(manifest.file_extensions, None);
    assert_eq!(manifest.install_modes, None);
    assert_eq!(manifest.manifest_version, "1.9.0");
}

#[test]
fn aggregator_sorts_installers() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let mut x64_exe = installer(Architecture::X64, "https://example.test/c.exe");
    x64_exe.installer_type = Some(InstallerType::Exe);
    let mut x86_msi = installer(Architecture::X86, "https://example.test/b.msi");
    x86_msi.installer_type = Some(InstallerType::Msi);
    let mut x64_msi = installer(Architecture::X64, "https://example.test/a.msi");
    x64_msi.installer_type = Some(InstallerType::Msi);

    let manifest = build_installer_manifest(
        &context,
        &ManifestInput::default(),
        vec![x64_exe, x86_msi, x64_msi],
        None,
    );
    let urls = manifest
        .installers
        .iter()
        .map(|i| i.installer_url.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        urls,
        vec![
            "https://example.test/b.msi",
            "https://example.test/a.msi",
            "https://example.test/c.exe",
        ]
    );
}

#[test]
fn session_reads_previous_installers_by_position() {
    let mut first_previous = installer(Architecture::X86, "https://example.test/old-x86.exe");
    first_previous.scope = Some(Scope::User);
    let mut second_previous = installer(Architecture::X64, "https://example.test/old-x64.exe");
    second_previous.scope = Some(Scope::Machine);
    let previous = previous_manifest(vec![first_previous, second_previous]);
    let context = BuildContext::new("Contoso.Widget", "2.0.0");

    let mut session = ManifestSession::new(&context, Some(&previous));
    let mut notified = Vec::new();
    for url in ["https://example.test/new-x86.exe", "https://example.test/new-x64.exe"] {
        let added = session.add_installer(&InstallerRequest::new(detection(url)), |installer| {
            notified.push(installer.installer_url.clone())
        });
        assert_eq!(added, 1);
    }
    assert_eq!(notified.len(), 2);
    assert_eq!(session.installers()[0].architecture, Architecture::X86);
    assert_eq!(session.installers()[1].architecture, Architecture::X64);

    let manifest = session.finish(&ManifestInput::default());
    assert_eq!(manifest.scope, None);
    assert_eq!(manifest.installers[0].scope, Some(Scope::User));
    assert_eq!(manifest.installers[1].scope, Some(Scope::Machine));
}

#[test]
fn session_counts_bundle_packages_toward_position() {
    let previous = previous_manifest(vec![
        installer(Architecture::X86, "https://example.test/old-1"),
        installer(Architecture::X64, "https://example.test/old-2"),
        installer(Architecture::Arm64, "https://example.test/old-3"),
    ]);
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let bundle = InstallerRequest::new(InstallerDetection {
        msix_bundle: Some(MsixBundleFacts {
            packages: vec![
                BundlePackage {
                    processor_architecture: Some(Architecture::X86),
                    target_device_family: None,
                },
                BundlePackage {
                    processor_architecture: Some(Architecture::X64),
                    target_device_family: None,
                },
            ],
            ..MsixBundleFacts::default()
        }),
        ..detection("https://example.test/widget.msixbundle")
    });

    let mut session = ManifestSession::new(&context, Some(&previous));
    assert_eq!(session.add_installer(&bundle, |_| {}), 2);
    assert_eq!(
        session.add_installer(
            &InstallerRequest::new(detection("https://example.test/widget-extra.exe")),
            |_| {}
        ),
        1
    );
    assert_eq!(session.installers()[2].architecture, Architecture::Arm64);
}

#[test]
fn session_rolls_nested_installer_paths_forward_once() {
    let mut previous_installer = installer(Architecture::X64, "https://example.test/tool-1.0-x64.zip");
    previous_installer.nested_installer_type = Some(NestedInstallerType::Portable);
    previous_installer.nested_installer_files = Some(vec![NestedInstallerFile {
        relative_file_path: "tool-1.0/tool.exe".to_string(),
        portable_command_alias: Some("tool".to_string()),
    }]);
    let previous = previous_manifest(vec![previous_installer]);
    let context = BuildContext::new("Contoso.Tool", "1.0-1").with_known_versions(["1.0"]);

    let mut session = ManifestSession::new(&context, Some(&previous));
    session.add_installer(
        &InstallerRequest::new(detection("https://example.test/tool-1.0-1-x64.zip")),
        |_| {},
    );
    let manifest = session.finish(&ManifestInput::default());

    assert_eq!(
        manifest.nested_installer_files,
        Some(vec![NestedInstallerFile {
            relative_file_path: "tool-1.0-1/tool.exe".to_string(),
            portable_command_alias: Some("tool".to_string()),
        }])
    );
    assert_eq!(manifest.nested_installer_type, Some(NestedInstallerType::Portable));
    assert_eq!(manifest.installers[0].nested_installer_files, None);
}

#[test]
fn session_ignores_blank_manifest_input_when_promoting() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let mut session = ManifestSession::new(&context, None);
    for url in [
        "https://example.test/widget-2.0.0-x86.exe",
        "https://example.test/widget-2.0.0-x64.exe",
    ] {
        let mut request = InstallerRequest::new(detection(url));
        request.input.installer_locale = Some("en-US".to_string());
        request.input.installer_switches = switches("/S");
        session.add_installer(&request, |_| {});
    }

    let manifest = session.finish(&ManifestInput {
        installer_locale: Some(String::new()),
        installer_switches: Some(InstallerSwitches::default()),
        ..ManifestInput::default()
    });

    assert_eq!(manifest.installer_locale.as_deref(), Some("en-US"));
    assert_eq!(manifest.installer_switches, Some(switches("/S")));
    for installer in &manifest.installers {
        assert_eq!(installer.installer_locale, None);
        assert_eq!(installer.installer_switches, None);
    }
}

#[test]
fn session_ignores_placeholder_minimum_os_version_input() {
    let context = BuildContext::new("Contoso.Widget", "2.0.0");
    let mut session = ManifestSession::new(&context, None);
    for url in [
        "https://example.test/widget-2.0.0-x86.msix",
        "https://example.test/widget-2.0.0-x64.msix",
    ] {
        let request = InstallerRequest::new(InstallerDetection {
            msix: Some(MsixFacts {
                min_version: Some("10.0.17763.0".to_string()),
                ..MsixFacts::default()
            }),
            ..detection(url)
        });
        session.add_installer(&request, |_| {});
    }

    let manifest = session.finish(&ManifestInput {
        minimum_os_version: Some(UNSET_MINIMUM_OS_VERSION.to_string()),
        ..ManifestInput::default()
    });

    assert_eq!(manifest.minimum_os_version.as_deref(), Some("10.0.17763.0"));
    assert!(manifest
        .installers
        .iter()
        .all(|installer| installer.minimum_os_version.is_none()));
}

#[test]
fn update_state_is_new_package_without_history() {
    let state = classify_update_state("1.0.0", None, |_| -> anyhow::Result<bool> {
        panic!("lookup must not run for a new package")
    })
    .expect("classification must succeed");
    assert_eq!(state, UpdateState::NewPackage);
}

#[test]
fn update_state_is_update_version_when_already_published() {
    let state = classify_update_state("1.0.0", Some("2.0.0"), |version| Ok(version == "1.0.0"))
        .expect("classification must succeed");
    assert_eq!(state, UpdateState::UpdateVersion);
}

#[test]
fn update_state_distinguishes_new_maximum_from_inserted_version() {
    let state = classify_update_state("2.0", Some("1.9.9"), |_| Ok(false))
        .expect("classification must succeed");
    assert_eq!(state, UpdateState::NewVersion);

    let state = classify_update_state("1.5", Some("1.9.9"), |_| Ok(false))
        .expect("classification must succeed");
    assert_eq!(state, UpdateState::AddVersion);

    let state = classify_update_state("2.0-beta", Some("2.0"), |_| Ok(false))
        .expect("classification must succeed");
    assert_eq!(state, UpdateState::AddVersion);
}

#[test]
fn update_state_propagates_lookup_failures() {
    let err = classify_update_state("2.0", Some("1.0"), |_| Err(anyhow!("index unavailable")))
        .expect_err("lookup failure must surface");
    assert!(err.to_string().contains("index unavailable"));
}

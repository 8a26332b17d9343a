use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;
use wingsmith_core::{Installer, InstallerManifest};
use wingsmith_reconcile::{classify_update_state, BuildContext, ManifestSession, UpdateState};
use wingsmith_repository::ManifestRepository;

use crate::request::BuildRequest;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Toml,
    Json,
}

#[derive(Debug)]
pub(crate) struct BuildOutcome {
    pub manifest: InstallerManifest,
    pub update_state: UpdateState,
    pub previous_version: Option<String>,
}

pub(crate) fn classify_against_repository(
    repository: &ManifestRepository,
    identifier: &str,
    version: &str,
) -> Result<UpdateState> {
    let latest = repository.latest_version(identifier)?;
    classify_update_state(version, latest.as_deref(), |candidate| {
        repository.version_exists(identifier, candidate)
    })
}

/// Runs a full build against the published history in `repository`.
///
/// `on_add` sees every installer as it is reconciled, before manifest-level
/// factoring strips shared fields from it.
pub(crate) fn build_manifest<F>(
    repository: &ManifestRepository,
    request: &BuildRequest,
    base_dir: &Path,
    mut on_add: F,
) -> Result<BuildOutcome>
where
    F: FnMut(&Installer),
{
    let identifier = request.package_identifier.as_str();
    let version = request.package_version.as_str();
    let installer_requests = request.installer_requests(base_dir)?;

    let update_state = classify_against_repository(repository, identifier, version)?;
    let known_versions = repository.package_versions(identifier)?;
    let published = repository.load_previous(identifier)?;
    info!(
        identifier,
        version,
        state = update_state.as_str(),
        known = known_versions.len(),
        "building installer manifest"
    );

    let mut context = BuildContext::new(identifier, version)
        .with_known_versions(known_versions.iter().filter(|known| known.as_str() != version).cloned())
        .with_update_state(update_state);
    if let Some(package_name) = &request.package_name {
        context = context.with_package_name(package_name.clone());
    }
    if let Some(publisher) = &request.publisher {
        context = context.with_publisher(publisher.clone());
    }

    let previous = published.as_ref().map(|published| &published.manifest);
    let mut session = ManifestSession::new(&context, previous);
    for installer_request in &installer_requests {
        session.add_installer(installer_request, &mut on_add);
    }
    if session.installers().is_empty() {
        anyhow::bail!("no installers were produced for {identifier} {version}");
    }

    let manifest = session.finish(&request.manifest);
    manifest
        .validate()
        .with_context(|| format!("built manifest for {identifier} {version} is invalid"))?;

    Ok(BuildOutcome {
        manifest,
        update_state,
        previous_version: published.map(|published| published.version),
    })
}

pub(crate) fn render_manifest(manifest: &InstallerManifest, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Toml => manifest.to_toml_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(manifest).context("failed to serialize manifest as JSON")
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use wingsmith_core::validate::{validate_package_identifier, validate_package_version};
use wingsmith_core::{DefaultLocale, InstallerManifest, PreviousManifest};
use wingsmith_version::compare_versions;

/// Published manifests laid out as
/// `manifests/<initial>/<identifier segments>/<version>/<identifier>.installer.toml`,
/// with an optional `<identifier>.locale.toml` beside each installer manifest.
#[derive(Debug, Clone)]
pub struct ManifestRepository {
    root: PathBuf,
}

/// The newest published release of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedManifest {
    pub version: String,
    pub manifest: PreviousManifest,
}

impl ManifestRepository {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_dir(&self, identifier: &str) -> Result<PathBuf> {
        validate_package_identifier(identifier)?;
        let initial = identifier
            .chars()
            .next()
            .map(|ch| ch.to_ascii_lowercase())
            .with_context(|| format!("package identifier is empty: {identifier}"))?;

        let mut dir = self.root.join("manifests").join(initial.to_string());
        for segment in identifier.split('.') {
            dir.push(segment);
        }
        Ok(dir)
    }

    /// Every published version of `identifier`, newest first.
    pub fn package_versions(&self, identifier: &str) -> Result<Vec<String>> {
        let package_dir = self.package_dir(identifier)?;
        if !package_dir.exists() {
            return Ok(Vec::new());
        }

        let installer_file = installer_file_name(identifier);
        let mut versions = Vec::new();
        for entry in fs::read_dir(&package_dir).with_context(|| {
            format!("failed to read package directory: {}", package_dir.display())
        })? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if !entry.path().join(&installer_file).is_file() {
                continue;
            }
            versions.push(entry.file_name().to_string_lossy().to_string());
        }

        versions.sort_by(|a, b| compare_versions(b, a));
        Ok(versions)
    }

    pub fn latest_version(&self, identifier: &str) -> Result<Option<String>> {
        Ok(self.package_versions(identifier)?.into_iter().next())
    }

    pub fn version_exists(&self, identifier: &str, version: &str) -> Result<bool> {
        Ok(self.installer_path(identifier, version)?.is_file())
    }

    pub fn load_manifest(&self, identifier: &str, version: &str) -> Result<PreviousManifest> {
        let installer_path = self.installer_path(identifier, version)?;
        let content = fs::read_to_string(&installer_path).with_context(|| {
            format!(
                "failed reading installer manifest: {}",
                installer_path.display()
            )
        })?;
        let installer = InstallerManifest::from_toml_str(&content).with_context(|| {
            format!(
                "failed parsing installer manifest: {}",
                installer_path.display()
            )
        })?;
        if installer.package_identifier != identifier || installer.package_version != version {
            anyhow::bail!(
                "installer manifest {} describes {} {}, expected {identifier} {version}",
                installer_path.display(),
                installer.package_identifier,
                installer.package_version
            );
        }

        let locale_path = installer_path.with_file_name(locale_file_name(identifier));
        let default_locale = match fs::read_to_string(&locale_path) {
            Ok(content) => Some(DefaultLocale::from_toml_str(&content).with_context(|| {
                format!("failed parsing locale manifest: {}", locale_path.display())
            })?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed reading locale manifest: {}", locale_path.display())
                })
            }
        };

        Ok(PreviousManifest {
            installer,
            default_locale,
        })
    }

    /// The newest published release, if one exists and can be read.
    ///
    /// A newest release that fails to load is logged and treated as absent.
    /// Listing failures are still errors.
    pub fn load_previous(&self, identifier: &str) -> Result<Option<PublishedManifest>> {
        let Some(version) = self.latest_version(identifier)? else {
            debug!(identifier, "no published versions");
            return Ok(None);
        };

        match self.load_manifest(identifier, &version) {
            Ok(manifest) => {
                debug!(identifier, version = %version, "loaded previous manifest");
                Ok(Some(PublishedManifest { version, manifest }))
            }
            Err(err) => {
                warn!(
                    identifier,
                    version = %version,
                    error = %format!("{err:#}"),
                    "ignoring unreadable previous manifest"
                );
                Ok(None)
            }
        }
    }

    fn installer_path(&self, identifier: &str, version: &str) -> Result<PathBuf> {
        validate_package_version(version)?;
        Ok(self
            .package_dir(identifier)?
            .join(version)
            .join(installer_file_name(identifier)))
    }
}

fn installer_file_name(identifier: &str) -> String {
    format!("{identifier}.installer.toml")
}

fn locale_file_name(identifier: &str) -> String {
    format!("{identifier}.locale.toml")
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use wingsmith_core::validate::{
    validate_file_extensions, validate_package_identifier, validate_package_version,
    validate_protocols, validate_release_date, validate_sha256,
};
use wingsmith_core::{
    ArchiveFacts, Architecture, InstallerDetection, InstallerType, MsiFacts, MsixBundleFacts,
    MsixFacts, ReleaseFacts,
};
use wingsmith_reconcile::{AdditionalMetadata, InstallerInput, InstallerRequest, ManifestInput};
use wingsmith_security::{sha256_file_hex, verify_sha256_file};

/// A manifest build described in TOML.
///
/// ```toml
/// package_identifier = "Contoso.Widget"
/// package_version = "2.0.0"
///
/// [manifest]
/// scope = "machine"
///
/// [[installers]]
/// installer_url = "https://example.test/widget-2.0.0-x64.exe"
/// installer_path = "downloads/widget-2.0.0-x64.exe"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuildRequest {
    pub package_identifier: String,
    pub package_version: String,
    pub package_name: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub manifest: ManifestInput,
    #[serde(default)]
    pub installers: Vec<InstallerEntry>,
}

/// One installer artifact plus whatever was learned by inspecting it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InstallerEntry {
    pub installer_url: String,
    pub installer_sha256: Option<String>,
    pub installer_path: Option<PathBuf>,
    #[serde(default, deserialize_with = "installer_type_alias")]
    pub installer_type: Option<InstallerType>,
    #[serde(default, deserialize_with = "architecture_alias")]
    pub architecture: Option<Architecture>,
    pub msi: Option<MsiFacts>,
    pub msix: Option<MsixFacts>,
    pub msix_bundle: Option<MsixBundleFacts>,
    pub archive: Option<ArchiveFacts>,
    pub release: Option<ReleaseFacts>,
    #[serde(default)]
    pub input: InstallerInput,
    pub additional_metadata: Option<AdditionalMetadata>,
}

/// Accepts common spellings such as `amd64` or `msixbundle`.
fn architecture_alias<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Architecture>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            Architecture::parse(&value)
                .ok_or_else(|| D::Error::custom(format!("unknown architecture: {value}")))
        })
        .transpose()
}

fn installer_type_alias<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<InstallerType>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            InstallerType::parse(&value)
                .ok_or_else(|| D::Error::custom(format!("unknown installer type: {value}")))
        })
        .transpose()
}

impl BuildRequest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading build request: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid build request: {}", path.display()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let request: Self = toml::from_str(input).context("failed to parse build request")?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        validate_package_identifier(&self.package_identifier)?;
        validate_package_version(&self.package_version)?;
        if self.installers.is_empty() {
            anyhow::bail!("build request lists no installers");
        }
        if let Some(extensions) = &self.manifest.file_extensions {
            validate_file_extensions(extensions)?;
        }
        if let Some(protocols) = &self.manifest.protocols {
            validate_protocols(protocols)?;
        }

        for (index, entry) in self.installers.iter().enumerate() {
            let number = index + 1;
            if entry.installer_url.trim().is_empty() {
                anyhow::bail!("installer #{number} has an empty installer_url");
            }
            if entry.installer_sha256.is_none() && entry.installer_path.is_none() {
                anyhow::bail!(
                    "installer #{number} ({}) needs installer_sha256 or installer_path",
                    entry.installer_url
                );
            }
            if let Some(sha256) = &entry.installer_sha256 {
                validate_sha256(sha256).with_context(|| {
                    format!(
                        "invalid installer_sha256 for installer #{number} ({})",
                        entry.installer_url
                    )
                })?;
            }
            for date in [
                entry.input.release_date.as_deref(),
                entry
                    .additional_metadata
                    .as_ref()
                    .and_then(|metadata| metadata.release_date.as_deref()),
            ]
            .into_iter()
            .flatten()
            {
                validate_release_date(date).with_context(|| {
                    format!(
                        "invalid release_date for installer #{number} ({})",
                        entry.installer_url
                    )
                })?;
            }
        }

        Ok(())
    }

    /// Turns every entry into a reconciler request.
    ///
    /// `installer_path` values are relative to `base_dir`.
    pub fn installer_requests(&self, base_dir: &Path) -> Result<Vec<InstallerRequest>> {
        self.installers
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_request(index + 1, base_dir))
            .collect()
    }
}

impl InstallerEntry {
    fn to_request(&self, number: usize, base_dir: &Path) -> Result<InstallerRequest> {
        let installer_sha256 = self.resolve_sha256(number, base_dir)?;
        let url = &self.installer_url;

        let detection = InstallerDetection {
            installer_type: self
                .installer_type
                .or_else(|| InstallerType::infer_from_url(url)),
            architecture: self
                .architecture
                .or_else(|| Architecture::infer_from_url(url)),
            msi: self.msi.clone(),
            msix: self.msix.clone(),
            msix_bundle: self.msix_bundle.clone(),
            archive: self.archive.clone(),
            release: self.release.clone(),
            ..InstallerDetection::new(url.clone(), installer_sha256)
        };

        Ok(InstallerRequest {
            detection,
            input: self.input.clone(),
            additional_metadata: self.additional_metadata.clone(),
        })
    }

    fn resolve_sha256(&self, number: usize, base_dir: &Path) -> Result<String> {
        let path = self.installer_path.as_ref().map(|path| base_dir.join(path));
        match (&self.installer_sha256, path) {
            (Some(expected), Some(path)) => {
                if !verify_sha256_file(&path, expected)? {
                    anyhow::bail!(
                        "sha256 mismatch for installer #{number} ({}): {} does not hash to {expected}",
                        self.installer_url,
                        path.display()
                    );
                }
                Ok(expected.trim().to_string())
            }
            (Some(expected), None) => Ok(expected.trim().to_string()),
            (None, Some(path)) => sha256_file_hex(&path),
            (None, None) => anyhow::bail!(
                "installer #{number} ({}) needs installer_sha256 or installer_path",
                self.installer_url
            ),
        }
    }
}

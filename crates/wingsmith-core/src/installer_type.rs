use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstallerType {
    Msix,
    Msi,
    Appx,
    Exe,
    Zip,
    Inno,
    Nullsoft,
    Wix,
    Burn,
    Pwa,
    Portable,
}

impl InstallerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Msix => "msix",
            Self::Msi => "msi",
            Self::Appx => "appx",
            Self::Exe => "exe",
            Self::Zip => "zip",
            Self::Inno => "inno",
            Self::Nullsoft => "nullsoft",
            Self::Wix => "wix",
            Self::Burn => "burn",
            Self::Pwa => "pwa",
            Self::Portable => "portable",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "msix" | "msixbundle" => Some(Self::Msix),
            "msi" => Some(Self::Msi),
            "appx" | "appxbundle" => Some(Self::Appx),
            "exe" => Some(Self::Exe),
            "zip" => Some(Self::Zip),
            "inno" => Some(Self::Inno),
            "nullsoft" => Some(Self::Nullsoft),
            "wix" => Some(Self::Wix),
            "burn" => Some(Self::Burn),
            "pwa" => Some(Self::Pwa),
            "portable" => Some(Self::Portable),
            _ => None,
        }
    }

    pub fn infer_from_url(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        let without_fragment = lower.split('#').next().unwrap_or(&lower);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);

        let (_, extension) = without_query.rsplit('/').next()?.rsplit_once('.')?;
        match extension {
            "msix" | "msixbundle" => Some(Self::Msix),
            "msi" => Some(Self::Msi),
            "appx" | "appxbundle" => Some(Self::Appx),
            "exe" => Some(Self::Exe),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NestedInstallerType {
    Msix,
    Msi,
    Appx,
    Exe,
    Inno,
    Nullsoft,
    Wix,
    Burn,
    Portable,
}

impl NestedInstallerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Msix => "msix",
            Self::Msi => "msi",
            Self::Appx => "appx",
            Self::Exe => "exe",
            Self::Inno => "inno",
            Self::Nullsoft => "nullsoft",
            Self::Wix => "wix",
            Self::Burn => "burn",
            Self::Portable => "portable",
        }
    }
}

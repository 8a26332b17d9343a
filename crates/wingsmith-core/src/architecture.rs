use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
    Arm,
    Arm64,
    Neutral,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X64 => "x64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Neutral => "neutral",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i686" => Some(Self::X86),
            "x64" | "x86_64" | "amd64" => Some(Self::X64),
            "arm" | "armv7" => Some(Self::Arm),
            "arm64" | "aarch64" => Some(Self::Arm64),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Guesses the architecture from markers in the installer file name.
    pub fn infer_from_url(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        let without_fragment = lower.split('#').next().unwrap_or(&lower);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);
        let file_name = without_query.rsplit('/').next().unwrap_or("");
        if file_name.is_empty() {
            return None;
        }

        if file_name.contains("arm64") || file_name.contains("aarch64") {
            return Some(Self::Arm64);
        }
        if file_name.contains("x86_64")
            || file_name.contains("x64")
            || file_name.contains("amd64")
            || file_name.contains("win64")
        {
            return Some(Self::X64);
        }
        if file_name.contains("x86")
            || file_name.contains("i386")
            || file_name.contains("i686")
            || file_name.contains("win32")
        {
            return Some(Self::X86);
        }
        if file_name.contains("arm") {
            return Some(Self::Arm);
        }

        None
    }
}

use anyhow::Result;
use tracing::debug;
use wingsmith_version::highest_version;

/// How the version being built relates to what is already published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    NewPackage,
    NewVersion,
    UpdateVersion,
    AddVersion,
}

impl UpdateState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewPackage => "new-package",
            Self::NewVersion => "new-version",
            Self::UpdateVersion => "update-version",
            Self::AddVersion => "add-version",
        }
    }
}

/// Classifies `chosen_version` against the package's release history.
///
/// `latest_version` is `None` when nothing was ever published. The lookup is
/// only consulted when history exists.
pub fn classify_update_state<F>(
    chosen_version: &str,
    latest_version: Option<&str>,
    version_exists: F,
) -> Result<UpdateState>
where
    F: FnOnce(&str) -> Result<bool>,
{
    let Some(latest_version) = latest_version else {
        return Ok(UpdateState::NewPackage);
    };

    let state = if version_exists(chosen_version)? {
        UpdateState::UpdateVersion
    } else if highest_version([chosen_version, latest_version]) == Some(chosen_version) {
        UpdateState::NewVersion
    } else {
        UpdateState::AddVersion
    };
    debug!(
        chosen_version,
        latest_version,
        state = state.as_str(),
        "classified update state"
    );
    Ok(state)
}

use wingsmith_version::substitute_version;

use crate::update_state::UpdateState;

/// Package identity and history shared by every step of one manifest build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub package_identifier: String,
    pub package_version: String,
    pub package_name: Option<String>,
    pub publisher: Option<String>,
    pub known_versions: Vec<String>,
    pub update_state: UpdateState,
}

impl BuildContext {
    pub fn new(package_identifier: impl Into<String>, package_version: impl Into<String>) -> Self {
        Self {
            package_identifier: package_identifier.into(),
            package_version: package_version.into(),
            package_name: None,
            publisher: None,
            known_versions: Vec::new(),
            update_state: UpdateState::NewPackage,
        }
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_known_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_update_state(mut self, update_state: UpdateState) -> Self {
        self.update_state = update_state;
        self
    }

    /// Rolls any previously published version embedded in `text` forward to
    /// the version being built.
    pub fn substitute(&self, text: &str) -> String {
        substitute_version(text, &self.known_versions, &self.package_version)
    }
}

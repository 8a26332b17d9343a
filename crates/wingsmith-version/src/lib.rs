mod ordering;
mod substitute;

pub use ordering::{compare_versions, highest_version, VersionPart, VersionToken};
pub use substitute::substitute_version;

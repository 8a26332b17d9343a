mod manifest_repository;

pub use manifest_repository::{ManifestRepository, PublishedManifest};

/// Gallery module
///
/// The gallery is a local mirror of the artifact store:
/// - Artifact records and snapshot normalization (mirror.rs)
/// - The subscription-driven synchronizer (sync.rs)
/// - Fetched thumbnail bytes for rendering remote artifacts (thumbs.rs)

pub mod mirror;
pub mod sync;
pub mod thumbs;

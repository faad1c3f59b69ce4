/// Fusion request module
///
/// This module owns the path from two validated uploads to a produced
/// artifact reference:
/// - The submission state machine with its single in-flight guarantee
///   (pipeline.rs)
/// - The HTTP client for the remote fusion endpoint (client.rs)

pub mod client;
pub mod pipeline;

/// Upload intake module
///
/// This module handles everything between "the user picked a file" and
/// "the slot holds a validated image with a live preview":
/// - Transient preview resources with exactly-once release (preview.rs)
/// - Candidate validation: type, size, decode probing (validator.rs)
/// - Per-slot state with last-submitted-wins semantics (slot.rs)

pub mod preview;
pub mod slot;
pub mod validator;

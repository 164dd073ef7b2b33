// ============================================================================
// spark-components - Entity Module
// Values handed between business logic and presentation
// ============================================================================

pub mod recoverable;

pub use recoverable::{RecoverableError, RecoverableErrorBuilder};

/// Emission placeholder for jobs whose result carries no information, only
/// the fact that they completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Irrelevant;

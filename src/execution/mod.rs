/// Execution Layer
///
/// This layer is responsible for:
/// - Flash-loan strike calldata encoding
/// - Call simulation against the strike contract before any submission
///
/// Transaction signing and submission stay with the caller.

pub mod strike;

// Re-export key components from the execution layer
pub use strike::{StrikeConfig, StrikeExecutor, StrikeOutcome};

/// Logic Layer - Loan Sizing
///
/// This layer is responsible for:
/// - Bounding flash-loan sizes against observed pool reserves
/// - The fail-open fallback policy when reserves cannot be read
///
/// Pure decision logic; all chain access goes through the data layer's
/// `ReserveSource` seam.

pub mod guard;
pub mod types;

// Re-export key components from the logic layer
pub use guard::{GuardConfig, LoanSizingGuard};
pub use types::{ReservePair, ReserveSide};

use crate::data_sync::reserves::ReserveSource;
use crate::logic::types::{ReservePair, ReserveSide};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Loan sizing policy
///
/// Integer arithmetic throughout; divisors must be non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Upper bound on the loan as a fraction of the borrowed asset's reserve:
    /// the loan never exceeds reserve / safety_divisor
    pub safety_divisor: u64,
    /// Divisor applied to the requested amount when reserves cannot be read
    pub fallback_divisor: u64,
    /// Which reserve slot holds the borrowed asset
    pub borrow_side: ReserveSide,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            // Never borrow more than 10% of the pool's reserve of the asset
            safety_divisor: 10,
            // Halve the request when the pool cannot be read
            fallback_divisor: 2,
            borrow_side: ReserveSide::Token0,
        }
    }
}

impl GuardConfig {
    /// Largest loan the pool can be expected to absorb, given its reserves
    pub fn max_safe_amount(&self, reserves: &ReservePair) -> U256 {
        reserves.side(self.borrow_side) / U256::from(self.safety_divisor)
    }

    /// Conservative loan size used when reserves are unknown
    pub fn fallback_amount(&self, requested: U256) -> U256 {
        requested / U256::from(self.fallback_divisor)
    }
}

/// Clamps requested flash-loan amounts to what the pool can absorb.
///
/// The guard never fails outward: an unreadable pool produces the fallback
/// amount, not an error, so the return value alone does not reveal which
/// path was taken.
pub struct LoanSizingGuard<S: ReserveSource> {
    config: GuardConfig,
    oracle: S,
}

impl<S: ReserveSource> LoanSizingGuard<S> {
    pub fn new(config: GuardConfig, oracle: S) -> eyre::Result<Self> {
        if config.safety_divisor == 0 {
            return Err(eyre::eyre!("safety_divisor must be non-zero"));
        }
        if config.fallback_divisor == 0 {
            return Err(eyre::eyre!("fallback_divisor must be non-zero"));
        }
        Ok(Self { config, oracle })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Size a loan against the pool's current reserves.
    ///
    /// The result is never larger than `requested`. A reserve of zero clamps
    /// any positive request to zero; callers treat a zero loan as an abort.
    pub async fn safe_loan_amount(&self, requested: U256, pool: Address) -> U256 {
        match self.oracle.reserves(pool).await {
            Ok(reserves) => {
                let max_safe = self.config.max_safe_amount(&reserves);
                if requested > max_safe {
                    info!(
                        "Pool {}: scaling loan from {} down to {} (1/{} of reserve {})",
                        pool,
                        requested,
                        max_safe,
                        self.config.safety_divisor,
                        reserves.side(self.config.borrow_side)
                    );
                    max_safe
                } else {
                    requested
                }
            }
            Err(e) => {
                let fallback = self.config.fallback_amount(requested);
                warn!(
                    "Pool {}: reserves unavailable ({}), using fallback amount {}",
                    pool, e, fallback
                );
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sync::reserves::MockReserveSource;

    fn pool() -> Address {
        Address::repeat_byte(0x42)
    }

    fn guard_with_reserves(reserve0: u64, reserve1: u64) -> LoanSizingGuard<MockReserveSource> {
        let oracle = MockReserveSource::with_reserves(U256::from(reserve0), U256::from(reserve1));
        LoanSizingGuard::new(GuardConfig::default(), oracle).unwrap()
    }

    #[tokio::test]
    async fn test_request_above_safe_share_is_clamped() {
        let guard = guard_with_reserves(200, 900_000);
        // 200 / 10 = 20 < 50
        let sized = guard.safe_loan_amount(U256::from(50u64), pool()).await;
        assert_eq!(sized, U256::from(20u64));
    }

    #[tokio::test]
    async fn test_request_within_safe_share_is_unchanged() {
        let guard = guard_with_reserves(200, 900_000);
        let sized = guard.safe_loan_amount(U256::from(15u64), pool()).await;
        assert_eq!(sized, U256::from(15u64));
    }

    #[tokio::test]
    async fn test_request_equal_to_safe_share_is_unchanged() {
        let guard = guard_with_reserves(200, 900_000);
        let sized = guard.safe_loan_amount(U256::from(20u64), pool()).await;
        assert_eq!(sized, U256::from(20u64));
    }

    #[tokio::test]
    async fn test_oracle_failure_halves_the_request() {
        let oracle = MockReserveSource::unavailable();
        let guard = LoanSizingGuard::new(GuardConfig::default(), oracle).unwrap();
        let sized = guard.safe_loan_amount(U256::from(100u64), pool()).await;
        assert_eq!(sized, U256::from(50u64));
    }

    #[tokio::test]
    async fn test_oracle_failure_floors_odd_requests() {
        let oracle = MockReserveSource::unavailable();
        let guard = LoanSizingGuard::new(GuardConfig::default(), oracle).unwrap();
        let sized = guard.safe_loan_amount(U256::from(101u64), pool()).await;
        assert_eq!(sized, U256::from(50u64));
    }

    #[tokio::test]
    async fn test_zero_request_returns_zero_on_every_path() {
        let guard = guard_with_reserves(200, 900_000);
        assert_eq!(guard.safe_loan_amount(U256::ZERO, pool()).await, U256::ZERO);

        let offline = LoanSizingGuard::new(GuardConfig::default(), MockReserveSource::unavailable()).unwrap();
        assert_eq!(offline.safe_loan_amount(U256::ZERO, pool()).await, U256::ZERO);
    }

    #[tokio::test]
    async fn test_empty_reserve_clamps_to_zero() {
        let guard = guard_with_reserves(0, 900_000);
        let sized = guard.safe_loan_amount(U256::from(100u64), pool()).await;
        assert_eq!(sized, U256::ZERO);
    }

    #[tokio::test]
    async fn test_never_increases_the_request() {
        let guard = guard_with_reserves(1_000_000, 1);
        for requested in [0u64, 1, 7, 99_999, 100_000, 100_001, u64::MAX] {
            let requested = U256::from(requested);
            assert!(guard.safe_loan_amount(requested, pool()).await <= requested);
        }
    }

    #[tokio::test]
    async fn test_sizing_is_idempotent_for_unchanged_reserves() {
        let guard = guard_with_reserves(200, 900_000);
        let first = guard.safe_loan_amount(U256::from(50u64), pool()).await;
        let second = guard.safe_loan_amount(U256::from(50u64), pool()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_borrow_side_selects_the_other_reserve() {
        let oracle = MockReserveSource::with_reserves(U256::from(200u64), U256::from(900u64));
        let config = GuardConfig { borrow_side: ReserveSide::Token1, ..GuardConfig::default() };
        let guard = LoanSizingGuard::new(config, oracle).unwrap();
        // 900 / 10 = 90
        let sized = guard.safe_loan_amount(U256::from(500u64), pool()).await;
        assert_eq!(sized, U256::from(90u64));
    }

    #[tokio::test]
    async fn test_alternate_fallback_divisor() {
        let config = GuardConfig { fallback_divisor: 4, ..GuardConfig::default() };
        let guard = LoanSizingGuard::new(config, MockReserveSource::unavailable()).unwrap();
        let sized = guard.safe_loan_amount(U256::from(100u64), pool()).await;
        assert_eq!(sized, U256::from(25u64));
    }

    #[tokio::test]
    async fn test_alternate_safety_divisor() {
        let oracle = MockReserveSource::with_reserves(U256::from(200u64), U256::from(900u64));
        let config = GuardConfig { safety_divisor: 5, ..GuardConfig::default() };
        let guard = LoanSizingGuard::new(config, oracle).unwrap();
        // 200 / 5 = 40
        let sized = guard.safe_loan_amount(U256::from(50u64), pool()).await;
        assert_eq!(sized, U256::from(40u64));
    }

    #[tokio::test]
    async fn test_large_amounts_stay_exact() {
        // Token amounts routinely exceed u64; make sure nothing truncates.
        let reserve = U256::from_str_radix("200000000000000000000000000000000000000000000000000000000000000000000000000", 10).unwrap();
        let oracle = MockReserveSource::with_reserves(reserve, U256::from(1u64));
        let guard = LoanSizingGuard::new(GuardConfig::default(), oracle).unwrap();

        let requested = reserve;
        let sized = guard.safe_loan_amount(requested, pool()).await;
        assert_eq!(sized, reserve / U256::from(10u64));
    }

    #[test]
    fn test_zero_divisors_are_rejected() {
        let config = GuardConfig { safety_divisor: 0, ..GuardConfig::default() };
        assert!(LoanSizingGuard::new(config, MockReserveSource::default()).is_err());

        let config = GuardConfig { fallback_divisor: 0, ..GuardConfig::default() };
        assert!(LoanSizingGuard::new(config, MockReserveSource::default()).is_err());
    }

    #[test]
    fn test_default_policy() {
        let config = GuardConfig::default();
        assert_eq!(config.safety_divisor, 10);
        assert_eq!(config.fallback_divisor, 2);
        assert_eq!(config.borrow_side, ReserveSide::Token0);
    }
}

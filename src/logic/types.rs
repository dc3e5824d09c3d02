use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which reserve slot of a two-asset pool holds the borrowed asset.
///
/// Pair contracts report reserves by position, not by token identity, so the
/// mapping from slot to asset is configuration. Whether a keyed-by-asset
/// lookup would be safer depends on the deployed pool's token ordering, which
/// cannot be confirmed from here.
#[derive(Copy, Clone, Debug, Display, PartialEq, Hash, Eq, EnumString, Default, Deserialize, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReserveSide {
    #[default]
    Token0,
    Token1,
}

/// Reserve quantities of a two-asset pool at the instant of the query.
///
/// Valid only for that instant; no staleness tracking is attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    pub reserve0: U256,
    pub reserve1: U256,
}

impl ReservePair {
    pub fn new(reserve0: U256, reserve1: U256) -> Self {
        Self { reserve0, reserve1 }
    }

    pub fn side(&self, side: ReserveSide) -> U256 {
        match side {
            ReserveSide::Token0 => self.reserve0,
            ReserveSide::Token1 => self.reserve1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ReserveSide::Token0), "TOKEN0");
        assert_eq!(format!("{}", ReserveSide::Token1), "TOKEN1");
    }

    #[test]
    fn test_side_selection() {
        let pair = ReservePair::new(U256::from(200u64), U256::from(900_000u64));
        assert_eq!(pair.side(ReserveSide::Token0), U256::from(200u64));
        assert_eq!(pair.side(ReserveSide::Token1), U256::from(900_000u64));
    }

    #[test]
    fn test_serde_round() {
        let side: ReserveSide = serde_json::from_str("\"TOKEN1\"").unwrap();
        assert_eq!(side, ReserveSide::Token1);
        assert_eq!(serde_json::to_string(&ReserveSide::Token0).unwrap(), "\"TOKEN0\"");
    }
}

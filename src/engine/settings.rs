//! Bet-size bounds and validation at the command boundary.
//!
//! Out-of-range or off-step values are rejected here and never reach the
//! engine state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::SimError;

/// Allowed range and step for one bet setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetLimits {
    pub name: &'static str,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

pub const MIN_BET_LIMITS: BetLimits = BetLimits {
    name: "min_bet",
    min: dec!(0.5),
    max: dec!(10),
    step: dec!(0.5),
};

pub const MAX_BET_LIMITS: BetLimits = BetLimits {
    name: "max_bet",
    min: dec!(10),
    max: dec!(500),
    step: dec!(10),
};

impl BetLimits {
    /// Accept `value` if it lies in range and on a step boundary.
    pub fn validate(&self, value: Decimal) -> Result<Decimal, SimError> {
        let in_range = value >= self.min && value <= self.max;
        let on_step = (value % self.step).is_zero();
        if in_range && on_step {
            Ok(value.normalize())
        } else {
            Err(SimError::InvalidBet {
                setting: self.name,
                value,
                min: self.min,
                max: self.max,
                step: self.step,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_bet_bounds() {
        assert_eq!(MIN_BET_LIMITS.validate(dec!(0.5)), Ok(dec!(0.5)));
        assert_eq!(MIN_BET_LIMITS.validate(dec!(10)), Ok(dec!(10)));
        assert_eq!(MIN_BET_LIMITS.validate(dec!(3.5)), Ok(dec!(3.5)));
        assert!(MIN_BET_LIMITS.validate(dec!(0)).is_err());
        assert!(MIN_BET_LIMITS.validate(dec!(10.5)).is_err());
        assert!(MIN_BET_LIMITS.validate(dec!(-1)).is_err());
    }

    #[test]
    fn test_min_bet_step() {
        assert!(MIN_BET_LIMITS.validate(dec!(0.75)).is_err());
        assert!(MIN_BET_LIMITS.validate(dec!(1.25)).is_err());
        assert!(MIN_BET_LIMITS.validate(dec!(2.00)).is_ok());
    }

    #[test]
    fn test_max_bet_bounds_and_step() {
        assert!(MAX_BET_LIMITS.validate(dec!(10)).is_ok());
        assert!(MAX_BET_LIMITS.validate(dec!(500)).is_ok());
        assert!(MAX_BET_LIMITS.validate(dec!(100)).is_ok());
        assert!(MAX_BET_LIMITS.validate(dec!(5)).is_err());
        assert!(MAX_BET_LIMITS.validate(dec!(510)).is_err());
        assert!(MAX_BET_LIMITS.validate(dec!(15)).is_err());
    }

    #[test]
    fn test_error_names_setting() {
        match MAX_BET_LIMITS.validate(dec!(1000)) {
            Err(SimError::InvalidBet { setting, value, .. }) => {
                assert_eq!(setting, "max_bet");
                assert_eq!(value, dec!(1000));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

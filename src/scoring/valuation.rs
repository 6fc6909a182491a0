use crate::models::{RewardEstimate, ScoreResult, Valuation};

/// Price the awarded tokens under a simulated FDV.
///
/// A non-positive or non-finite FDV prices the token at zero. The FDV is a
/// what-if input and is not capped here.
pub fn value_at(tokens_awarded: f64, total_supply: f64, fdv: f64) -> Valuation {
    let fdv = if fdv.is_finite() { fdv.max(0.0) } else { 0.0 };
    let token_price = if fdv > 0.0 && total_supply > 0.0 {
        fdv / total_supply
    } else {
        0.0
    };

    Valuation {
        fdv,
        token_price,
        worth_usd: tokens_awarded * token_price,
    }
}

impl Valuation {
    pub fn of(score: &ScoreResult, total_supply: f64, fdv: f64) -> Self {
        value_at(score.tokens_awarded, total_supply, fdv)
    }
}

impl RewardEstimate {
    /// Re-price at another FDV without refetching.
    pub fn revalue(&mut self, fdv: f64) {
        self.valuation = value_at(self.score.tokens_awarded, self.total_supply, fdv);
        self.tagline = tagline(self.valuation.worth_usd).to_string();
    }
}

pub fn tagline(worth_usd: f64) -> &'static str {
    match worth_usd.floor() {
        w if w >= 100_000.0 => "Time for a vacation",
        w if w >= 10_000.0 => "I cooked very hard",
        w if w >= 1_000.0 => "4 figures, who dis?",
        w if w >= 100.0 => "I printed a good bag",
        _ => "We go again",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_and_worth() {
        let v = value_at(222_222.22, 1_000_000_000.0, 1_000_000_000.0);
        assert_eq!(v.token_price, 1.0);
        assert_eq!(v.worth_usd, 222_222.22);
    }

    #[test]
    fn test_worth_is_linear_in_fdv() {
        let tokens = 41_000.0;
        let single = value_at(tokens, 8_390_000_000.0, 700_000_000.0);
        let double = value_at(tokens, 8_390_000_000.0, 1_400_000_000.0);
        assert!((double.worth_usd - 2.0 * single.worth_usd).abs() < 1e-9);
    }

    #[test]
    fn test_zero_and_invalid_fdv_price_nothing() {
        assert_eq!(value_at(100.0, 1e9, 0.0).worth_usd, 0.0);
        assert_eq!(value_at(100.0, 1e9, -5.0).fdv, 0.0);
        assert_eq!(value_at(100.0, 1e9, f64::NAN).token_price, 0.0);
    }

    #[test]
    fn test_fdv_above_slider_maximum_is_not_capped() {
        let v = value_at(1.0, 1e9, 9e9);
        assert_eq!(v.token_price, 9.0);
    }

    #[test]
    fn test_taglines() {
        assert_eq!(tagline(250_000.0), "Time for a vacation");
        assert_eq!(tagline(10_000.0), "I cooked very hard");
        assert_eq!(tagline(9_999.99), "4 figures, who dis?");
        assert_eq!(tagline(100.5), "I printed a good bag");
        assert_eq!(tagline(99.99), "We go again");
        assert_eq!(tagline(0.0), "We go again");
    }
}

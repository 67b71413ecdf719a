//! Split calculator
//!
//! Pure functions: resolve the effective split for an athlete and divide a
//! base price between athlete and platform. The platform share is always
//! derived as `base - payout`, so the two shares reconcile to the base price
//! whatever the rounding of the payout.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{FeeConfiguration, SplitSource};
use crate::money::{normalize_amount, normalize_fraction, MONEY_SCALE};
use crate::{Error, Result};

/// A validated (repasse, comissão) pair summing to exactly 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    repasse: Decimal,
    comissao: Decimal,
}

impl Split {
    /// Build a split, rejecting pairs that do not sum to exactly 1
    pub fn new(repasse: Decimal, comissao: Decimal) -> Result<Self> {
        let repasse = normalize_fraction(repasse, "repasse")?;
        let comissao = normalize_fraction(comissao, "comissao")?;
        if repasse + comissao != Decimal::ONE {
            return Err(Error::InvalidSplit(format!(
                "repasse {} + comissao {} = {}, expected 1",
                repasse,
                comissao,
                repasse + comissao
            )));
        }
        Ok(Self { repasse, comissao })
    }

    /// Split where the platform takes `commission` and the athlete the rest
    pub fn from_commission(commission: Decimal) -> Result<Self> {
        let commission = normalize_fraction(commission, "differentiated_commission")?;
        Self::new(Decimal::ONE - commission, commission)
    }

    pub fn repasse(&self) -> Decimal {
        self.repasse
    }

    pub fn comissao(&self) -> Decimal {
        self.comissao
    }
}

/// Monetary breakdown of one licensing transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAmounts {
    pub total_value: Decimal,
    pub athlete_payout: Decimal,
    pub platform_commission: Decimal,
}

/// Divide `base_price` according to `split`
///
/// `usage_type` is recorded by callers and does not affect the arithmetic.
pub fn calculate(
    base_price: Decimal,
    _usage_type: &str,
    term_months: u32,
    split: &Split,
) -> Result<SplitAmounts> {
    if base_price <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "base price must be positive, got {}",
            base_price
        )));
    }
    if term_months == 0 {
        return Err(Error::InvalidInput("term_months must be positive".to_string()));
    }
    // Deserialized splits never went through Split::new
    if split.repasse + split.comissao != Decimal::ONE {
        return Err(Error::InvalidSplit(format!(
            "repasse {} + comissao {} != 1",
            split.repasse, split.comissao
        )));
    }

    let total_value = normalize_amount(base_price, "base_price")?;
    let athlete_payout = (total_value * split.repasse)
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
    let platform_commission = total_value - athlete_payout;

    Ok(SplitAmounts {
        total_value,
        athlete_payout,
        platform_commission,
    })
}

/// Resolve the split for one athlete: override if present, else global
pub fn resolve_split(
    global: &FeeConfiguration,
    commission_override: Option<Decimal>,
) -> Result<(Split, SplitSource)> {
    let resolved = match commission_override {
        Some(commission) => {
            Split::from_commission(commission).map(|split| (split, SplitSource::AthleteOverride))
        }
        None => Split::new(
            global.repasse_atleta_fraction,
            global.comissao_plataforma_fraction,
        )
        .map(|split| (split, SplitSource::Global)),
    };

    resolved.map_err(|e| {
        // Stored configuration failed validation: data integrity fault
        error!(
            error = %e,
            config_version = global.version,
            has_override = commission_override.is_some(),
            "Stored fee split failed validation"
        );
        match e {
            Error::InvalidInput(msg) => Error::InvalidSplit(msg),
            other => other,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn global(repasse: &str, comissao: &str) -> FeeConfiguration {
        FeeConfiguration {
            repasse_atleta_fraction: d(repasse),
            comissao_plataforma_fraction: d(comissao),
            legal_note: String::new(),
            version: 1,
            updated_at: time::now(),
            updated_by: "test".to_string(),
        }
    }

    #[test]
    fn test_split_requires_exact_unit_sum() {
        assert!(Split::new(d("0.70"), d("0.30")).is_ok());
        assert!(Split::new(d("1"), d("0")).is_ok());
        let err = Split::new(d("0.65"), d("0.34")).unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
        let err = Split::new(d("0.7001"), d("0.3")).unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
    }

    #[test]
    fn test_from_commission_complements() {
        let split = Split::from_commission(d("0.20")).unwrap();
        assert_eq!(split.repasse(), d("0.8"));
        assert_eq!(split.comissao(), d("0.2"));
    }

    #[test]
    fn test_calculate_70_30() {
        let split = Split::new(d("0.70"), d("0.30")).unwrap();
        let amounts = calculate(d("1000.00"), "editorial", 12, &split).unwrap();
        assert_eq!(amounts.total_value, d("1000.00"));
        assert_eq!(amounts.athlete_payout, d("700.00"));
        assert_eq!(amounts.platform_commission, d("300.00"));
    }

    #[test]
    fn test_calculate_reconciles_with_rounding() {
        // 0.01 * 0.3333 and friends force rounding of the payout
        let split = Split::new(d("0.3333"), d("0.6667")).unwrap();
        for price in ["0.01", "0.05", "10.00", "99.99", "1234.57", "33.33"] {
            let amounts = calculate(d(price), "ad", 1, &split).unwrap();
            assert_eq!(
                amounts.athlete_payout + amounts.platform_commission,
                amounts.total_value,
                "price {}",
                price
            );
            assert_eq!(amounts.athlete_payout.scale(), MONEY_SCALE);
        }
    }

    #[test]
    fn test_calculate_uses_bankers_rounding() {
        // 0.05 * 0.5 = 0.025 -> 0.02 (half to even)
        let split = Split::new(d("0.5"), d("0.5")).unwrap();
        let amounts = calculate(d("0.05"), "ad", 1, &split).unwrap();
        assert_eq!(amounts.athlete_payout, d("0.02"));
        assert_eq!(amounts.platform_commission, d("0.03"));
    }

    #[test]
    fn test_calculate_rejects_bad_input() {
        let split = Split::new(d("0.7"), d("0.3")).unwrap();
        assert!(matches!(calculate(d("0"), "ad", 12, &split), Err(Error::InvalidInput(_))));
        assert!(matches!(calculate(d("-5"), "ad", 12, &split), Err(Error::InvalidInput(_))));
        assert!(matches!(calculate(d("10"), "ad", 0, &split), Err(Error::InvalidInput(_))));
        assert!(matches!(calculate(d("10.005"), "ad", 1, &split), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_prefers_override() {
        let config = global("0.70", "0.30");

        let (split, source) = resolve_split(&config, None).unwrap();
        assert_eq!(source, SplitSource::Global);
        assert_eq!(split.repasse(), d("0.7"));

        let (split, source) = resolve_split(&config, Some(d("0.20"))).unwrap();
        assert_eq!(source, SplitSource::AthleteOverride);
        assert_eq!(split.repasse(), d("0.8"));
        assert_eq!(split.comissao(), d("0.2"));
    }

    #[test]
    fn test_resolve_flags_corrupt_configuration() {
        let config = global("0.65", "0.34");
        assert!(matches!(resolve_split(&config, None), Err(Error::InvalidSplit(_))));

        let config = global("0.70", "0.30");
        assert!(matches!(
            resolve_split(&config, Some(d("1.5"))),
            Err(Error::InvalidSplit(_))
        ));
    }
}

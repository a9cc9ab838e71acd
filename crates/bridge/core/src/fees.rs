use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wei per gwei
const GWEI: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Fee suggestion of one gas estimate bucket, in decimal gwei
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFeeLevelEstimate {
    pub suggested_max_priority_fee_per_gas: Decimal,
    pub suggested_max_fee_per_gas: Decimal,
}

/// EIP-1559 gas fee estimates for the source chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFeeEstimates {
    pub estimated_base_fee: Decimal,
    pub low: GasFeeLevelEstimate,
    pub medium: GasFeeLevelEstimate,
    pub high: GasFeeLevelEstimate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasFeeLevel {
    Low,
    Medium,
    /// Conservative estimate used for fee display by default
    #[default]
    High,
}

impl GasFeeEstimates {
    pub fn level(&self, level: GasFeeLevel) -> &GasFeeLevelEstimate {
        match level {
            GasFeeLevel::Low => &self.low,
            GasFeeLevel::Medium => &self.medium,
            GasFeeLevel::High => &self.high,
        }
    }
}

/// Fees per gas unit used to price the network fee of a quote
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeFeesPerGas {
    pub estimated_base_fee_gwei: Option<Decimal>,
    pub max_priority_fee_per_gas_gwei: Option<Decimal>,
    pub max_fee_per_gas_gwei: Option<Decimal>,
}

impl BridgeFeesPerGas {
    /// Picks the configured bucket out of the estimates. Missing estimates leave every
    /// fee unknown.
    pub fn from_estimates(estimates: Option<&GasFeeEstimates>, level: GasFeeLevel) -> Self {
        let Some(estimates) = estimates else {
            return Self::default();
        };
        let bucket = estimates.level(level);
        Self {
            estimated_base_fee_gwei: Some(estimates.estimated_base_fee),
            max_priority_fee_per_gas_gwei: Some(bucket.suggested_max_priority_fee_per_gas),
            max_fee_per_gas_gwei: Some(bucket.suggested_max_fee_per_gas),
        }
    }

    /// Base fee plus priority fee, in gwei
    pub fn fee_per_gas_gwei(&self) -> Option<Decimal> {
        self.estimated_base_fee_gwei?
            .checked_add(self.max_priority_fee_per_gas_gwei?)
    }

    pub fn max_fee_per_gas_wei(&self) -> Option<u128> {
        gwei_to_wei(self.max_fee_per_gas_gwei?)
    }

    pub fn max_priority_fee_per_gas_wei(&self) -> Option<u128> {
        gwei_to_wei(self.max_priority_fee_per_gas_gwei?)
    }
}

/// Converts decimal gwei into whole wei, rounding sub-wei fractions down.
pub fn gwei_to_wei(gwei: Decimal) -> Option<u128> {
    if gwei.is_sign_negative() {
        return None;
    }
    let wei = gwei.checked_mul(GWEI)?.trunc();
    wei.to_string().parse().ok()
}

/// Converts a gas amount priced in gwei into native units (ether).
pub fn gwei_to_native(gwei: Decimal) -> Option<Decimal> {
    gwei.checked_div(GWEI)
}

//! Inverse questions on the margin target: how much can be paid for the
//! property, and how much must it sell for, for the deal to land exactly on
//! `min_profit_margin_percent` with every other parameter held fixed.
//!
//! Both answers follow the same numeric policy as `compute`: a zero
//! denominator yields an infinity or NaN rather than an error.

use super::engine::{acquisition_multiplier, compute, resale_multiplier};
use super::types::{SimulationParameters, TargetPrices};

pub fn target_prices(params: &SimulationParameters) -> TargetPrices {
    TargetPrices {
        max_purchase_price: max_purchase_price(params),
        required_sale_price_per_m2: required_sale_price_per_m2(params),
    }
}

/// Highest list price at which the margin still meets the target.
pub fn max_purchase_price(params: &SimulationParameters) -> f64 {
    let results = compute(params);
    let max_total_cost = results.net_sale_price / margin_factor(params);
    let acquisition_budget =
        max_total_cost - results.adjusted_works_cost - results.total_holding_costs;
    acquisition_budget / acquisition_multiplier(params)
}

/// Lowest resale price per m² at which the margin meets the target.
pub fn required_sale_price_per_m2(params: &SimulationParameters) -> f64 {
    let results = compute(params);
    let required_net = results.total_cost_of_return * margin_factor(params);
    required_net / (params.surface * resale_multiplier(params))
}

fn margin_factor(params: &SimulationParameters) -> f64 {
    1.0 + params.min_profit_margin_percent / 100.0
}

use super::types::{SimulationParameters, SimulationResults};

#[derive(Debug, Clone, Copy)]
struct CostBreakdown {
    acquisition: f64,
    works: f64,
    holding: f64,
}

impl CostBreakdown {
    fn total(self) -> f64 {
        self.acquisition + self.works + self.holding
    }
}

#[derive(Debug, Clone, Copy)]
struct ResaleBreakdown {
    gross: f64,
    agency_fees: f64,
    net: f64,
}

/// Derives the full result set from one parameter set.
///
/// Total for every input: divisions by a zero cost or by a zero resale
/// multiplier produce IEEE infinities or NaN, which are returned as-is.
pub fn compute(params: &SimulationParameters) -> SimulationResults {
    let costs = cost_breakdown(params);
    let total_cost_of_return = costs.total();
    let resale = resale_breakdown(params);

    let gross_margin_euro = resale.net - total_cost_of_return;
    let gross_margin_percent = (gross_margin_euro / total_cost_of_return) * 100.0;
    let break_even_price = total_cost_of_return / resale_multiplier(params);
    let target_met = gross_margin_percent >= params.min_profit_margin_percent;

    SimulationResults {
        net_acquisition_cost: costs.acquisition,
        adjusted_works_cost: costs.works,
        total_holding_costs: costs.holding,
        total_cost_of_return,
        target_sale_price: resale.gross,
        seller_agency_fees_amount: resale.agency_fees,
        net_sale_price: resale.net,
        gross_margin_euro,
        gross_margin_percent,
        break_even_price,
        target_met,
    }
}

fn cost_breakdown(params: &SimulationParameters) -> CostBreakdown {
    CostBreakdown {
        acquisition: params.list_price * acquisition_multiplier(params),
        works: params.surface * params.renovation_cost_per_m2 * (1.0 + params.contingency_margin),
        holding: f64::from(params.holding_duration_months) * monthly_carrying_cost(params),
    }
}

fn resale_breakdown(params: &SimulationParameters) -> ResaleBreakdown {
    let gross = params.surface * params.target_sale_price_per_m2;
    let agency_fees = gross * params.seller_agency_fees;
    let net = gross * (1.0 - params.sale_negotiation) - agency_fees;
    ResaleBreakdown {
        gross,
        agency_fees,
        net,
    }
}

/// List price to net acquisition cost.
pub(crate) fn acquisition_multiplier(params: &SimulationParameters) -> f64 {
    (1.0 - params.purchase_negotiation)
        * (1.0 + params.notary_fees)
        * (1.0 + params.buyer_agency_fees)
}

pub(crate) fn monthly_carrying_cost(params: &SimulationParameters) -> f64 {
    params.monthly_interest + params.monthly_condo_charges + params.monthly_property_tax
}

/// Share of the asking sale price left after negotiation and seller fees.
pub(crate) fn resale_multiplier(params: &SimulationParameters) -> f64 {
    1.0 - params.seller_agency_fees - params.sale_negotiation
}

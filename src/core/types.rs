use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParamError;

/// One complete set of deal inputs. Fractions are expressed as ratios
/// (0.05 is 5%), except `min_profit_margin_percent` which is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub list_price: f64,
    pub purchase_negotiation: f64,
    pub notary_fees: f64,
    pub buyer_agency_fees: f64,

    pub surface: f64,
    #[serde(rename = "renovationCostPerM2")]
    pub renovation_cost_per_m2: f64,
    pub contingency_margin: f64,

    pub holding_duration_months: i32,
    pub monthly_interest: f64,
    pub monthly_condo_charges: f64,
    pub monthly_property_tax: f64,

    #[serde(rename = "targetSalePricePerM2")]
    pub target_sale_price_per_m2: f64,
    pub seller_agency_fees: f64,
    pub sale_negotiation: f64,
    pub min_profit_margin_percent: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            list_price: 300_000.0,
            purchase_negotiation: 0.05,
            notary_fees: 0.08,
            buyer_agency_fees: 0.05,
            surface: 100.0,
            renovation_cost_per_m2: 500.0,
            contingency_margin: 0.1,
            holding_duration_months: 6,
            monthly_interest: 500.0,
            monthly_condo_charges: 100.0,
            monthly_property_tax: 50.0,
            target_sale_price_per_m2: 4_500.0,
            seller_agency_fees: 0.05,
            sale_negotiation: 0.02,
            min_profit_margin_percent: 20.0,
        }
    }
}

impl SimulationParameters {
    pub fn get(&self, field: ParamField) -> f64 {
        match field {
            ParamField::ListPrice => self.list_price,
            ParamField::PurchaseNegotiation => self.purchase_negotiation,
            ParamField::NotaryFees => self.notary_fees,
            ParamField::BuyerAgencyFees => self.buyer_agency_fees,
            ParamField::Surface => self.surface,
            ParamField::RenovationCostPerM2 => self.renovation_cost_per_m2,
            ParamField::ContingencyMargin => self.contingency_margin,
            ParamField::HoldingDurationMonths => f64::from(self.holding_duration_months),
            ParamField::MonthlyInterest => self.monthly_interest,
            ParamField::MonthlyCondoCharges => self.monthly_condo_charges,
            ParamField::MonthlyPropertyTax => self.monthly_property_tax,
            ParamField::TargetSalePricePerM2 => self.target_sale_price_per_m2,
            ParamField::SellerAgencyFees => self.seller_agency_fees,
            ParamField::SaleNegotiation => self.sale_negotiation,
            ParamField::MinProfitMarginPercent => self.min_profit_margin_percent,
        }
    }

    /// Writes one field in place. The only check is that the holding
    /// duration, an integer field, receives a whole number.
    pub fn set(&mut self, field: ParamField, value: f64) -> Result<(), ParamError> {
        match field {
            ParamField::ListPrice => self.list_price = value,
            ParamField::PurchaseNegotiation => self.purchase_negotiation = value,
            ParamField::NotaryFees => self.notary_fees = value,
            ParamField::BuyerAgencyFees => self.buyer_agency_fees = value,
            ParamField::Surface => self.surface = value,
            ParamField::RenovationCostPerM2 => self.renovation_cost_per_m2 = value,
            ParamField::ContingencyMargin => self.contingency_margin = value,
            ParamField::HoldingDurationMonths => {
                self.holding_duration_months = whole_months(field, value)?;
            }
            ParamField::MonthlyInterest => self.monthly_interest = value,
            ParamField::MonthlyCondoCharges => self.monthly_condo_charges = value,
            ParamField::MonthlyPropertyTax => self.monthly_property_tax = value,
            ParamField::TargetSalePricePerM2 => self.target_sale_price_per_m2 = value,
            ParamField::SellerAgencyFees => self.seller_agency_fees = value,
            ParamField::SaleNegotiation => self.sale_negotiation = value,
            ParamField::MinProfitMarginPercent => self.min_profit_margin_percent = value,
        }
        Ok(())
    }
}

fn whole_months(field: ParamField, value: f64) -> Result<i32, ParamError> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(ParamError::NotAWholeNumber { field, value });
    }
    Ok(value as i32)
}

/// Names one settable parameter; `name` is the camelCase wire name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParamField {
    ListPrice,
    PurchaseNegotiation,
    NotaryFees,
    BuyerAgencyFees,
    Surface,
    RenovationCostPerM2,
    ContingencyMargin,
    HoldingDurationMonths,
    MonthlyInterest,
    MonthlyCondoCharges,
    MonthlyPropertyTax,
    TargetSalePricePerM2,
    SellerAgencyFees,
    SaleNegotiation,
    MinProfitMarginPercent,
}

impl ParamField {
    pub const ALL: [ParamField; 15] = [
        ParamField::ListPrice,
        ParamField::PurchaseNegotiation,
        ParamField::NotaryFees,
        ParamField::BuyerAgencyFees,
        ParamField::Surface,
        ParamField::RenovationCostPerM2,
        ParamField::ContingencyMargin,
        ParamField::HoldingDurationMonths,
        ParamField::MonthlyInterest,
        ParamField::MonthlyCondoCharges,
        ParamField::MonthlyPropertyTax,
        ParamField::TargetSalePricePerM2,
        ParamField::SellerAgencyFees,
        ParamField::SaleNegotiation,
        ParamField::MinProfitMarginPercent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamField::ListPrice => "listPrice",
            ParamField::PurchaseNegotiation => "purchaseNegotiation",
            ParamField::NotaryFees => "notaryFees",
            ParamField::BuyerAgencyFees => "buyerAgencyFees",
            ParamField::Surface => "surface",
            ParamField::RenovationCostPerM2 => "renovationCostPerM2",
            ParamField::ContingencyMargin => "contingencyMargin",
            ParamField::HoldingDurationMonths => "holdingDurationMonths",
            ParamField::MonthlyInterest => "monthlyInterest",
            ParamField::MonthlyCondoCharges => "monthlyCondoCharges",
            ParamField::MonthlyPropertyTax => "monthlyPropertyTax",
            ParamField::TargetSalePricePerM2 => "targetSalePricePerM2",
            ParamField::SellerAgencyFees => "sellerAgencyFees",
            ParamField::SaleNegotiation => "saleNegotiation",
            ParamField::MinProfitMarginPercent => "minProfitMarginPercent",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamField {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| ParamError::UnknownField(s.to_string()))
    }
}

/// Everything derived from one parameter set. Percent and break-even fields
/// may be infinite or NaN when their denominators are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub net_acquisition_cost: f64,
    pub adjusted_works_cost: f64,
    pub total_holding_costs: f64,
    pub total_cost_of_return: f64,
    pub target_sale_price: f64,
    pub seller_agency_fees_amount: f64,
    pub net_sale_price: f64,
    pub gross_margin_euro: f64,
    pub gross_margin_percent: f64,
    pub break_even_price: f64,
    pub target_met: bool,
}

/// Fields recovered from free-form listing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingExtract {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
}

impl ListingExtract {
    pub fn is_empty(&self) -> bool {
        self.list_price.is_none() && self.surface.is_none()
    }

    /// The extracted values as field updates, price first.
    pub fn updates(&self) -> impl Iterator<Item = (ParamField, f64)> {
        [
            self.list_price.map(|v| (ParamField::ListPrice, v)),
            self.surface.map(|v| (ParamField::Surface, v)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Inverse answers for the margin target; see `solver`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPrices {
    pub max_purchase_price: f64,
    #[serde(rename = "requiredSalePricePerM2")]
    pub required_sale_price_per_m2: f64,
}

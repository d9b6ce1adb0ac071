//! Plain-text rendering of a simulation, in the French presentation the
//! results panel uses. Non-finite values are shown as `N/A`.

use std::fmt;

use crate::core::{ListingExtract, SimulationParameters, SimulationResults, TargetPrices};

pub const NOT_AVAILABLE: &str = "N/A";

const GROUP_SEPARATOR: char = '\u{202f}';
const CURRENCY_SUFFIX: &str = "\u{a0}€";

/// Formats a euro amount as `fr-FR` does: grouped thousands, decimal comma,
/// two decimals.
pub fn format_eur(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = format!("{:.2}", value.abs());
    let (units, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{sign}{},{cents}{CURRENCY_SUFFIX}", group_thousands(units))
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{value:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

pub fn target_banner(params: &SimulationParameters, results: &SimulationResults) -> String {
    let margin = format_percent(results.gross_margin_percent);
    let threshold = params.min_profit_margin_percent;
    if results.target_met {
        format!("CIBLE ATTEINTE: marge de {margin} >= {threshold}%")
    } else {
        format!("CIBLE NON ATTEINTE: marge de {margin} < {threshold}%")
    }
}

/// One simulation laid out as the results panel: optional listing section,
/// banner, margin, cost detail, margin targets.
pub struct Report<'a> {
    pub params: &'a SimulationParameters,
    pub results: &'a SimulationResults,
    pub targets: &'a TargetPrices,
    pub extracted: Option<&'a ListingExtract>,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.results;

        if let Some(extracted) = self.extracted {
            write_listing(f, extracted)?;
        }

        writeln!(f, "{}", target_banner(self.params, results))?;
        writeln!(f)?;

        writeln!(f, "Marge brute potentielle")?;
        row(f, "Marge (€)", &format_eur(results.gross_margin_euro))?;
        row(f, "Marge (%)", &format_percent(results.gross_margin_percent))?;
        writeln!(f)?;

        writeln!(f, "Détail des coûts")?;
        row(f, "Coût achat net", &format_eur(results.net_acquisition_cost))?;
        row(f, "Coût travaux", &format_eur(results.adjusted_works_cost))?;
        row(f, "Frais portage", &format_eur(results.total_holding_costs))?;
        row(f, "Coût revient total", &format_eur(results.total_cost_of_return))?;
        row(f, "Prix vente cible", &format_eur(results.target_sale_price))?;
        row(
            f,
            "Frais agence revente",
            &format_eur(results.seller_agency_fees_amount),
        )?;
        row(f, "Prix vente net", &format_eur(results.net_sale_price))?;
        row(f, "Seuil rentabilité", &format_eur(results.break_even_price))?;
        writeln!(f)?;

        writeln!(f, "Objectif de marge")?;
        row(f, "Prix achat max", &format_eur(self.targets.max_purchase_price))?;
        row(
            f,
            "Prix vente requis (€/m²)",
            &format_eur(self.targets.required_sale_price_per_m2),
        )
    }
}

fn write_listing(f: &mut fmt::Formatter<'_>, extracted: &ListingExtract) -> fmt::Result {
    writeln!(f, "Annonce analysée")?;
    if extracted.is_empty() {
        writeln!(f, "  aucun prix ni surface détecté")?;
    }
    if let Some(price) = extracted.list_price {
        row(f, "Prix affiché", &format_eur(price))?;
    }
    if let Some(surface) = extracted.surface {
        row(f, "Surface", &format!("{surface} m²"))?;
    }
    writeln!(f)
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "  {label:<26}{value:>18}")
}

pub fn render_report(
    params: &SimulationParameters,
    results: &SimulationResults,
    targets: &TargetPrices,
    extracted: Option<&ListingExtract>,
) -> String {
    Report {
        params,
        results,
        targets,
        extracted,
    }
    .to_string()
}

use tracing::debug;

use super::engine::compute;
use super::extractor::extract;
use super::solver::target_prices;
use super::types::{
    ListingExtract, ParamField, SimulationParameters, SimulationResults, TargetPrices,
};
use super::ParamError;

/// Returns a copy of `current` with `field` replaced by `value`.
pub fn update(
    current: &SimulationParameters,
    field: ParamField,
    value: f64,
) -> Result<SimulationParameters, ParamError> {
    let mut next = *current;
    next.set(field, value)?;
    Ok(next)
}

/// The live parameter set and the results derived from it.
///
/// Every mutation goes through `update` or `apply_extract`, both of which
/// recompute before returning, so `results` always equals
/// `compute(params)`.
#[derive(Debug, Clone)]
pub struct Simulator {
    params: SimulationParameters,
    results: SimulationResults,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulationParameters::default())
    }
}

impl Simulator {
    pub fn new(params: SimulationParameters) -> Self {
        let results = compute(&params);
        Self { params, results }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn results(&self) -> &SimulationResults {
        &self.results
    }

    pub fn targets(&self) -> TargetPrices {
        target_prices(&self.params)
    }

    pub fn update(
        &mut self,
        field: ParamField,
        value: f64,
    ) -> Result<&SimulationResults, ParamError> {
        let next = update(&self.params, field, value)?;
        debug!(%field, value, "parameter updated");
        self.commit(next);
        Ok(&self.results)
    }

    /// Applies each extracted field as its own update, then recomputes once.
    pub fn apply_extract(
        &mut self,
        extracted: &ListingExtract,
    ) -> Result<&SimulationResults, ParamError> {
        if extracted.is_empty() {
            return Ok(&self.results);
        }

        let mut next = self.params;
        for (field, value) in extracted.updates() {
            next = update(&next, field, value)?;
            debug!(%field, value, "parameter extracted from listing");
        }
        self.commit(next);
        Ok(&self.results)
    }

    /// Runs the listing extractor over `text` and applies what it finds.
    pub fn analyze(&mut self, text: &str) -> Result<ListingExtract, ParamError> {
        let extracted = extract(text);
        if extracted.is_empty() {
            debug!("listing text carried no price or surface");
        }
        self.apply_extract(&extracted)?;
        Ok(extracted)
    }

    fn commit(&mut self, params: SimulationParameters) {
        self.results = compute(&params);
        self.params = params;
    }
}

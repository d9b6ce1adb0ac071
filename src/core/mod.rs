mod engine;
mod error;
mod extractor;
mod solver;
mod store;
mod types;

pub use engine::compute;
pub use error::ParamError;
pub use extractor::extract;
pub use solver::{max_purchase_price, required_sale_price_per_m2, target_prices};
pub use store::{Simulator, update};
pub use types::{ListingExtract, ParamField, SimulationParameters, SimulationResults, TargetPrices};

pub mod report;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::core::{
    ListingExtract, ParamError, ParamField, SimulationParameters, SimulationResults, Simulator,
    TargetPrices,
};

const SERVICE_NAME: &str = "flip";
const SERVICE_DESCRIPTION: &str = "Buy-renovate-resell profitability simulator";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid parameter: {field} - {message}")]
    InvalidParameter { field: String, message: String },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] JsonRejection),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidParameter { .. }
            | ApiError::Param(_)
            | ApiError::InvalidPayload(_)
            | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        if status == StatusCode::BAD_REQUEST {
            warn!(error = %self, "rejected simulation request");
        }
        json_response(
            status,
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Parser, Debug)]
#[command(
    name = "flip",
    about = "Profitability simulator for buy-renovate-resell property deals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Report(ReportCommand),
    /// Serve the simulator over HTTP
    Serve {
        #[arg(long, env = "FLIP_PORT", default_value_t = 8080)]
        port: u16,
    },
}

/// Subcommands that print a simulation and exit.
#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Compute the cost and margin breakdown for one set of parameters
    Simulate {
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long, help = "Print parameters and results as JSON")]
        json: bool,
    },
    /// Pull price and surface out of listing text, then simulate
    Analyze {
        #[arg(help = "Listing text, e.g. \"Appartement 250000 € - 75 m²\"")]
        text: String,
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long, help = "Print parameters and results as JSON")]
        json: bool,
    },
}

/// Deal parameters as typed on the command line. Rates are in percent.
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    #[arg(
        long,
        default_value_t = 300_000.0,
        allow_negative_numbers = true,
        help = "Asking price in euros"
    )]
    list_price: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Discount negotiated on the asking price in percent"
    )]
    purchase_negotiation: f64,
    #[arg(
        long,
        default_value_t = 8.0,
        allow_negative_numbers = true,
        help = "Notary fees in percent"
    )]
    notary_fees: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Buyer-side agency fees in percent"
    )]
    buyer_agency_fees: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        allow_negative_numbers = true,
        help = "Surface in m²"
    )]
    surface: f64,
    #[arg(
        long,
        default_value_t = 500.0,
        allow_negative_numbers = true,
        help = "Renovation budget in euros per m²"
    )]
    renovation_cost_per_m2: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_negative_numbers = true,
        help = "Contingency margin on works in percent"
    )]
    contingency_margin: f64,
    #[arg(
        long,
        default_value_t = 6,
        allow_negative_numbers = true,
        help = "Holding duration in months"
    )]
    holding_duration_months: i32,
    #[arg(
        long,
        default_value_t = 500.0,
        allow_negative_numbers = true,
        help = "Loan interest per month in euros"
    )]
    monthly_interest: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        allow_negative_numbers = true,
        help = "Condominium charges per month in euros"
    )]
    monthly_condo_charges: f64,
    #[arg(
        long,
        default_value_t = 50.0,
        allow_negative_numbers = true,
        help = "Property tax per month in euros"
    )]
    monthly_property_tax: f64,
    #[arg(
        long,
        default_value_t = 4_500.0,
        allow_negative_numbers = true,
        help = "Target resale price in euros per m²"
    )]
    target_sale_price_per_m2: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Seller-side agency fees in percent of the sale price"
    )]
    seller_agency_fees: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        allow_negative_numbers = true,
        help = "Discount conceded on the resale price in percent"
    )]
    sale_negotiation: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        allow_negative_numbers = true,
        help = "Minimum gross margin in percent of total cost"
    )]
    min_profit_margin: f64,
}

/// Overrides for the default parameter set, in the simulator's own units
/// (rates as fractions, margin threshold in percent).
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    list_price: Option<f64>,
    purchase_negotiation: Option<f64>,
    notary_fees: Option<f64>,
    buyer_agency_fees: Option<f64>,
    surface: Option<f64>,
    #[serde(rename = "renovationCostPerM2")]
    renovation_cost_per_m2: Option<f64>,
    contingency_margin: Option<f64>,
    holding_duration_months: Option<f64>,
    monthly_interest: Option<f64>,
    monthly_condo_charges: Option<f64>,
    monthly_property_tax: Option<f64>,
    #[serde(rename = "targetSalePricePerM2")]
    target_sale_price_per_m2: Option<f64>,
    seller_agency_fees: Option<f64>,
    sale_negotiation: Option<f64>,
    min_profit_margin_percent: Option<f64>,
}

impl SimulatePayload {
    fn overrides(&self) -> [(ParamField, Option<f64>); 15] {
        [
            (ParamField::ListPrice, self.list_price),
            (ParamField::PurchaseNegotiation, self.purchase_negotiation),
            (ParamField::NotaryFees, self.notary_fees),
            (ParamField::BuyerAgencyFees, self.buyer_agency_fees),
            (ParamField::Surface, self.surface),
            (ParamField::RenovationCostPerM2, self.renovation_cost_per_m2),
            (ParamField::ContingencyMargin, self.contingency_margin),
            (ParamField::HoldingDurationMonths, self.holding_duration_months),
            (ParamField::MonthlyInterest, self.monthly_interest),
            (ParamField::MonthlyCondoCharges, self.monthly_condo_charges),
            (ParamField::MonthlyPropertyTax, self.monthly_property_tax),
            (ParamField::TargetSalePricePerM2, self.target_sale_price_per_m2),
            (ParamField::SellerAgencyFees, self.seller_agency_fees),
            (ParamField::SaleNegotiation, self.sale_negotiation),
            (ParamField::MinProfitMarginPercent, self.min_profit_margin_percent),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzePayload {
    text: String,
    #[serde(flatten)]
    parameters: SimulatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    #[serde(default)]
    parameters: SimulatePayload,
    field: String,
    value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    parameters: SimulationParameters,
    results: SimulationResults,
    targets: TargetPrices,
}

impl From<&Simulator> for SimulateResponse {
    fn from(simulator: &Simulator) -> Self {
        Self {
            parameters: *simulator.params(),
            results: *simulator.results(),
            targets: simulator.targets(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    extracted: ListingExtract,
    #[serde(flatten)]
    simulation: SimulateResponse,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn finite(field: &str, value: f64) -> ApiResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::InvalidParameter {
            field: field.to_string(),
            message: format!("must be a finite number, got {value}"),
        })
    }
}

pub fn build_params(args: &ParamArgs) -> ApiResult<SimulationParameters> {
    Ok(SimulationParameters {
        list_price: finite("--list-price", args.list_price)?,
        purchase_negotiation: finite("--purchase-negotiation", args.purchase_negotiation)? / 100.0,
        notary_fees: finite("--notary-fees", args.notary_fees)? / 100.0,
        buyer_agency_fees: finite("--buyer-agency-fees", args.buyer_agency_fees)? / 100.0,
        surface: finite("--surface", args.surface)?,
        renovation_cost_per_m2: finite("--renovation-cost-per-m2", args.renovation_cost_per_m2)?,
        contingency_margin: finite("--contingency-margin", args.contingency_margin)? / 100.0,
        holding_duration_months: args.holding_duration_months,
        monthly_interest: finite("--monthly-interest", args.monthly_interest)?,
        monthly_condo_charges: finite("--monthly-condo-charges", args.monthly_condo_charges)?,
        monthly_property_tax: finite("--monthly-property-tax", args.monthly_property_tax)?,
        target_sale_price_per_m2: finite(
            "--target-sale-price-per-m2",
            args.target_sale_price_per_m2,
        )?,
        seller_agency_fees: finite("--seller-agency-fees", args.seller_agency_fees)? / 100.0,
        sale_negotiation: finite("--sale-negotiation", args.sale_negotiation)? / 100.0,
        min_profit_margin_percent: finite("--min-profit-margin", args.min_profit_margin)?,
    })
}

/// Runs a report subcommand and returns what should be printed.
pub fn run_command(command: &ReportCommand) -> ApiResult<String> {
    match command {
        ReportCommand::Simulate { params, json } => {
            let simulator = Simulator::new(build_params(params)?);
            if *json {
                return Ok(to_json(&SimulateResponse::from(&simulator)));
            }
            Ok(report::render_report(
                simulator.params(),
                simulator.results(),
                &simulator.targets(),
                None,
            ))
        }
        ReportCommand::Analyze { text, params, json } => {
            let mut simulator = Simulator::new(build_params(params)?);
            let extracted = simulator.analyze(text)?;
            if *json {
                return Ok(to_json(&AnalyzeResponse {
                    extracted,
                    simulation: SimulateResponse::from(&simulator),
                }));
            }
            Ok(report::render_report(
                simulator.params(),
                simulator.results(),
                &simulator.targets(),
                Some(&extracted),
            ))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Every response type here is plain data; non-finite floats become null.
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/defaults", get(defaults_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/update", post(update_handler))
        .route("/api/analyze", post(analyze_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "flip HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}

async fn root_handler() -> Response {
    json_response(
        StatusCode::OK,
        ServiceInfo {
            name: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            description: SERVICE_DESCRIPTION,
        },
    )
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "healthy",
            message: "API is running successfully",
        },
    )
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, SimulationParameters::default())
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn simulate_get_handler(
    payload: Result<Query<SimulatePayload>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(payload) = payload?;
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(
    payload: Result<Json<SimulatePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> ApiResult<Response> {
    let simulator = simulator_from_payload(&payload)?;
    Ok(json_response(StatusCode::OK, SimulateResponse::from(&simulator)))
}

async fn update_handler(
    payload: Result<Json<UpdatePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let simulator = apply_update(payload)?;
    Ok(json_response(StatusCode::OK, SimulateResponse::from(&simulator)))
}

async fn analyze_handler(
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let response = analyze_payload(payload)?;
    Ok(json_response(StatusCode::OK, response))
}

fn simulator_from_payload(payload: &SimulatePayload) -> ApiResult<Simulator> {
    let mut params = SimulationParameters::default();
    for (field, value) in payload.overrides() {
        if let Some(value) = value {
            params.set(field, finite(field.name(), value)?)?;
        }
    }
    Ok(Simulator::new(params))
}

fn apply_update(payload: UpdatePayload) -> ApiResult<Simulator> {
    let field: ParamField = payload.field.parse()?;
    let value = finite(field.name(), payload.value)?;
    let mut simulator = simulator_from_payload(&payload.parameters)?;
    simulator.update(field, value)?;
    Ok(simulator)
}

fn analyze_payload(payload: AnalyzePayload) -> ApiResult<AnalyzeResponse> {
    let mut simulator = simulator_from_payload(&payload.parameters)?;
    let extracted = simulator.analyze(&payload.text)?;
    Ok(AnalyzeResponse {
        extracted,
        simulation: SimulateResponse::from(&simulator),
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-store"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header::CONTENT_TYPE},
    };
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse_args(extra: &[&str]) -> ParamArgs {
        let argv = ["flip", "simulate"].into_iter().chain(extra.iter().copied());
        match Cli::try_parse_from(argv).expect("valid command line").command {
            Command::Report(ReportCommand::Simulate { params, .. }) => params,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn simulate_from_json(json: &str) -> ApiResult<Simulator> {
        let payload = serde_json::from_str::<SimulatePayload>(json).expect("payload parses");
        simulator_from_payload(&payload)
    }

    #[test]
    fn cli_defaults_match_default_parameter_set() {
        let params = build_params(&parse_args(&[])).expect("valid defaults");
        assert_eq!(params, SimulationParameters::default());
    }

    #[test]
    fn cli_rates_are_converted_from_percent() {
        let args = parse_args(&[
            "--notary-fees",
            "7.5",
            "--sale-negotiation",
            "3",
            "--holding-duration-months",
            "-2",
            "--min-profit-margin",
            "15",
        ]);
        let params = build_params(&args).expect("valid inputs");
        assert_approx(params.notary_fees, 0.075);
        assert_approx(params.sale_negotiation, 0.03);
        assert_eq!(params.holding_duration_months, -2);
        assert_approx(params.min_profit_margin_percent, 15.0);
    }

    #[test]
    fn cli_rejects_non_finite_inputs() {
        let args = parse_args(&["--surface", "inf"]);
        let err = build_params(&args).expect_err("must reject infinite surface");
        assert!(err.to_string().contains("--surface"));
    }

    #[test]
    fn cli_rejects_fractional_holding_duration() {
        let argv = ["flip", "simulate", "--holding-duration-months", "6.5"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn cli_serve_reads_port_flag() {
        let cli = Cli::try_parse_from(["flip", "serve", "--port", "9000"]).expect("valid");
        assert!(matches!(cli.command, Command::Serve { port: 9000 }));
    }

    #[test]
    fn simulate_command_renders_report() {
        let command = ReportCommand::Simulate {
            params: parse_args(&[]),
            json: false,
        };
        let output = run_command(&command).expect("simulation runs");
        assert!(output.contains("CIBLE NON ATTEINTE"));
    }

    #[test]
    fn analyze_command_json_contains_extracted_fields() {
        let cli = Cli::try_parse_from([
            "flip",
            "analyze",
            "Appartement 250000 € - 75 m²",
            "--json",
        ])
        .expect("valid command line");
        let Command::Report(command) = cli.command else {
            panic!("expected a report command");
        };
        let output = run_command(&command).expect("analysis runs");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(value["extracted"]["listPrice"], 250_000.0);
        assert_eq!(value["extracted"]["surface"], 75.0);
        assert_eq!(value["parameters"]["listPrice"], 250_000.0);
        assert_eq!(value["parameters"]["surface"], 75.0);
        assert!(value["results"]["targetMet"].is_boolean());
    }

    #[test]
    fn payload_overrides_only_named_fields() {
        let simulator = simulate_from_json(
            r#"{
              "listPrice": 250000,
              "renovationCostPerM2": 800,
              "targetSalePricePerM2": 5200,
              "holdingDurationMonths": 9
            }"#,
        )
        .expect("valid payload");
        let params = simulator.params();

        assert_approx(params.list_price, 250_000.0);
        assert_approx(params.renovation_cost_per_m2, 800.0);
        assert_approx(params.target_sale_price_per_m2, 5_200.0);
        assert_eq!(params.holding_duration_months, 9);
        assert_approx(params.notary_fees, 0.08);
        assert_eq!(*simulator.results(), compute(params));
    }

    #[test]
    fn empty_payload_simulates_defaults() {
        let simulator = simulate_from_json("{}").expect("valid payload");
        assert_eq!(*simulator.params(), SimulationParameters::default());
    }

    #[test]
    fn payload_rejects_fractional_holding_duration() {
        let err = simulate_from_json(r#"{"holdingDurationMonths": 2.5}"#)
            .err()
            .expect("must reject fractional months");
        assert!(matches!(err, ApiError::Param(ParamError::NotAWholeNumber { .. })));
    }

    #[test]
    fn update_applies_single_field_over_payload_parameters() {
        let payload: UpdatePayload = serde_json::from_str(
            r#"{"parameters": {"surface": 80}, "field": "targetSalePricePerM2", "value": 5000}"#,
        )
        .expect("payload parses");
        let simulator = apply_update(payload).expect("valid update");

        assert_approx(simulator.params().surface, 80.0);
        assert_approx(simulator.params().target_sale_price_per_m2, 5_000.0);
        assert_approx(simulator.results().target_sale_price, 400_000.0);
    }

    #[test]
    fn update_rejects_unknown_field() {
        let payload: UpdatePayload = serde_json::from_str(r#"{"field": "askingPrice", "value": 1}"#)
            .expect("payload parses");
        let err = apply_update(payload).err().expect("must reject unknown field");
        assert_eq!(err.to_string(), "unknown parameter: askingPrice");
    }

    #[test]
    fn analyze_payload_applies_extraction_on_top_of_overrides() {
        let payload: AnalyzePayload = serde_json::from_str(
            r#"{"text": "Studio 25 m² à rénover", "listPrice": 120000}"#,
        )
        .expect("payload parses");
        let response = analyze_payload(payload).expect("analysis runs");

        assert_eq!(response.extracted.list_price, None);
        assert_eq!(response.extracted.surface, Some(25.0));
        assert_approx(response.simulation.parameters.list_price, 120_000.0);
        assert_approx(response.simulation.parameters.surface, 25.0);
    }

    #[test]
    fn non_finite_results_serialize_as_null() {
        let simulator = simulate_from_json(
            r#"{"listPrice": 0, "renovationCostPerM2": 0, "holdingDurationMonths": 0,
                "sellerAgencyFees": 0.5, "saleNegotiation": 0.5}"#,
        )
        .expect("valid payload");
        let json = serde_json::to_value(SimulateResponse::from(&simulator))
            .expect("response should serialize");

        assert!(json["results"]["grossMarginPercent"].is_null());
        assert!(json["results"]["breakEvenPrice"].is_null());
        assert!(json["results"]["targetMet"].is_boolean());
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let simulator = Simulator::default();
        let json = serde_json::to_string(&SimulateResponse::from(&simulator))
            .expect("response should serialize");
        for key in [
            "\"parameters\"",
            "\"results\"",
            "\"targets\"",
            "\"netAcquisitionCost\"",
            "\"adjustedWorksCost\"",
            "\"totalHoldingCosts\"",
            "\"totalCostOfReturn\"",
            "\"targetSalePrice\"",
            "\"sellerAgencyFeesAmount\"",
            "\"netSalePrice\"",
            "\"grossMarginEuro\"",
            "\"grossMarginPercent\"",
            "\"breakEvenPrice\"",
            "\"targetMet\"",
            "\"renovationCostPerM2\"",
            "\"targetSalePricePerM2\"",
            "\"maxPurchasePrice\"",
            "\"requiredSalePricePerM2\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn analyze_response_flattens_simulation() {
        let payload: AnalyzePayload =
            serde_json::from_str(r#"{"text": "belle vue"}"#).expect("payload parses");
        let response = analyze_payload(payload).expect("analysis runs");
        let json = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(json["extracted"], serde_json::json!({}));
        assert!(json["parameters"].is_object());
        assert!(json["results"].is_object());
    }

    #[test]
    fn api_errors_map_to_status_codes() {
        let bad = ApiError::from(ParamError::UnknownField("x".to_string())).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn analyze_payload_reads_top_level_overrides() {
        let payload: AnalyzePayload =
            serde_json::from_str(r#"{"text": "belle vue", "listPrice": 120000, "surface": 60}"#)
                .expect("payload parses");
        let response = analyze_payload(payload).expect("analysis runs");

        assert!(response.extracted.is_empty());
        assert_approx(response.simulation.parameters.list_price, 120_000.0);
        assert_approx(response.simulation.parameters.surface, 60.0);
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = serde_json::from_slice(&bytes).expect("body is JSON");
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let (status, body) = send(get_request("/api/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn health_route_reports_healthy() {
        let (status, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn defaults_route_returns_default_parameter_set() {
        let (status, body) = send(get_request("/api/defaults")).await;
        assert_eq!(status, StatusCode::OK);
        let expected =
            serde_json::to_value(SimulationParameters::default()).expect("defaults serialize");
        assert_eq!(body, expected);
        assert_eq!(body["listPrice"], 300_000.0);
    }

    #[tokio::test]
    async fn simulate_query_string_uses_wire_names() {
        let (status, body) = send(get_request(
            "/api/simulate?listPrice=250000&renovationCostPerM2=800&targetSalePricePerM2=5200",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["parameters"]["listPrice"], 250_000.0);
        assert_eq!(body["parameters"]["renovationCostPerM2"], 800.0);
        assert_eq!(body["parameters"]["targetSalePricePerM2"], 5_200.0);
        assert_eq!(body["parameters"]["surface"], 100.0);
        assert_eq!(body["results"]["targetSalePrice"], 520_000.0);
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_bad_request() {
        let (status, body) = send(get_request("/api/simulate?surface=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| e.starts_with("Invalid query")));
    }

    #[tokio::test]
    async fn mistyped_json_field_is_a_json_bad_request() {
        let (status, body) = send(post_json("/api/simulate", r#"{"surface":"abc"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| e.starts_with("Invalid payload")));
    }

    #[tokio::test]
    async fn missing_content_type_is_a_json_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/update")
            .body(Body::from(r#"{"field":"surface","value":80}"#))
            .expect("valid request");
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn analyze_route_applies_top_level_overrides() {
        let (status, body) = send(post_json(
            "/api/analyze",
            r#"{"text":"belle vue","listPrice":120000}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extracted"], serde_json::json!({}));
        assert_eq!(body["parameters"]["listPrice"], 120_000.0);
    }
}

//! SecurePremium API Gateway
//!
//! REST front end over the four core components:
//! - DeviceScorer: registration and trust scoring
//! - RiskCalculator: telemetry-based risk assessment
//! - ReputationNetwork: threat intelligence ledger
//! - PremiumEngine: quote generation
//!
//! The components are single-threaded state machines; the gateway serializes
//! writes by holding each behind an RwLock.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use securepremium_common::types::telemetry::{
    DeviceMetrics, HistoricalBaseline, NetworkReputationSignal,
};
use securepremium_common::util::{validate_device_id, validate_unit_score};
use securepremium_common::{
    PremiumQuote, RiskAssessment, SecurePremiumError, Severity,
};
use securepremium_pricing::PremiumEngine;
use securepremium_reputation::{
    NetworkStatistics, ReputationNetwork, ReputationView, ThreatIntelligenceSummary,
};
use securepremium_risk::RiskCalculator;
use securepremium_scoring::{DeviceScorer, GeoLocation, ScoreBreakdown};

// ============ STATE ============

#[derive(Clone)]
struct AppState {
    scorer: Arc<RwLock<DeviceScorer>>,
    network: Arc<RwLock<ReputationNetwork>>,
    calculator: Arc<RiskCalculator>,
    engine: Arc<PremiumEngine>,
}

impl AppState {
    fn new() -> Self {
        Self {
            scorer: Arc::new(RwLock::new(DeviceScorer::new())),
            network: Arc::new(RwLock::new(ReputationNetwork::new("default"))),
            calculator: Arc::new(RiskCalculator::new()),
            engine: Arc::new(PremiumEngine::new()),
        }
    }
}

// ============ ERRORS ============

struct ApiError(SecurePremiumError);

impl From<SecurePremiumError> for ApiError {
    fn from(err: SecurePremiumError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use securepremium_common::{PricingError, ReputationError, ScoringError};

        let status = match &self.0 {
            SecurePremiumError::Scoring(ScoringError::DeviceNotFound(_)) => StatusCode::NOT_FOUND,
            SecurePremiumError::Scoring(ScoringError::MissingFingerprint) => {
                StatusCode::BAD_REQUEST
            }
            SecurePremiumError::Reputation(ReputationError::UnregisteredParticipant(_)) => {
                StatusCode::FORBIDDEN
            }
            SecurePremiumError::Reputation(ReputationError::ReportNotFound(_))
            | SecurePremiumError::Reputation(ReputationError::DeviceNotTracked(_)) => {
                StatusCode::NOT_FOUND
            }
            SecurePremiumError::Pricing(PricingError::UnknownCoverageTier(_))
            | SecurePremiumError::Pricing(PricingError::InvalidDistribution { .. })
            | SecurePremiumError::Pricing(PricingError::InvalidDeviceCount)
            | SecurePremiumError::Pricing(PricingError::InvalidPolicyDuration) => {
                StatusCode::BAD_REQUEST
            }
            SecurePremiumError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

fn validation_error(message: impl Into<String>) -> ApiError {
    ApiError(SecurePremiumError::Validation(message.into()))
}

fn require_device_id(device_id: &str) -> Result<(), ApiError> {
    if !validate_device_id(device_id) {
        return Err(validation_error(format!(
            "device_id must be 8-128 characters, got {}",
            device_id.len()
        )));
    }
    Ok(())
}

// ============ REQUEST / RESPONSE TYPES ============

#[derive(Debug, Deserialize)]
struct RegisterDeviceRequest {
    device_id: String,
    fingerprint_hash: Option<String>,
    #[serde(default)]
    hardware_info: HashMap<String, String>,
    #[serde(default)]
    system_info: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct RegisterDeviceResponse {
    device_id: String,
    fingerprint_hash: String,
    interaction_count: u64,
    first_seen: chrono::DateTime<chrono::Utc>,
    last_seen: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
struct AssessRiskRequest {
    device_id: String,
    metrics: DeviceMetrics,
    historical_data: Option<HistoricalBaseline>,
    network_reputation: Option<NetworkReputationSignal>,
}

#[derive(Debug, Serialize)]
struct AssessRiskResponse {
    assessment: RiskAssessment,
    risk_category: String,
}

#[derive(Debug, Serialize)]
struct DeviceScoreResponse {
    device_id: String,
    overall_score: f64,
    category: String,
    breakdown: ScoreBreakdown,
}

#[derive(Debug, Deserialize)]
struct SecurityEventRequest {
    event_type: String,
    severity: Severity,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RecordLocationRequest {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    device_id: String,
    metrics: DeviceMetrics,
    coverage_level: String,
    #[serde(default = "default_duration")]
    policy_duration_months: u32,
    /// Overrides the network-derived reputation when supplied
    reputation_score: Option<f64>,
    device_count: Option<u32>,
}

fn default_duration() -> u32 {
    12
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    quote: PremiumQuote,
    risk_category: String,
}

#[derive(Debug, Deserialize)]
struct RegisterParticipantRequest {
    participant_id: String,
}

#[derive(Debug, Serialize)]
struct RegisterParticipantResponse {
    participant_id: String,
    newly_registered: bool,
}

#[derive(Debug, Deserialize)]
struct ThreatReportRequest {
    reporter_id: String,
    device_id: String,
    threat_type: String,
    severity: Severity,
    description: String,
    evidence_hash: String,
}

#[derive(Debug, Serialize)]
struct ReputationResponse {
    device_id: String,
    risk_level: String,
    reputation: Option<ReputationView>,
}

// ============ HANDLERS ============

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "device_scorer": true,
            "risk_calculator": true,
            "reputation_network": true,
            "premium_engine": true
        }
    }))
}

async fn get_stats(State(state): State<AppState>) -> Json<NetworkStatistics> {
    let network = state.network.read().await;
    Json(network.get_network_statistics())
}

async fn register_device(
    State(state): State<AppState>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<RegisterDeviceResponse>), ApiError> {
    require_device_id(&request.device_id)?;

    let mut scorer = state.scorer.write().await;
    let profile = scorer.register_device(
        &request.device_id,
        request.fingerprint_hash.as_deref(),
        request.hardware_info,
        request.system_info,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterDeviceResponse {
            device_id: profile.device_id.clone(),
            fingerprint_hash: profile.fingerprint_hash.clone(),
            interaction_count: profile.interaction_count,
            first_seen: profile.first_seen,
            last_seen: profile.last_seen,
        }),
    ))
}

async fn get_device_score(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceScoreResponse>, ApiError> {
    let scorer = state.scorer.read().await;
    let (overall_score, breakdown) = scorer.calculate_device_score(&device_id)?;
    let category = scorer.get_device_score_category(overall_score);

    Ok(Json(DeviceScoreResponse {
        device_id,
        overall_score,
        category: category.to_string(),
        breakdown,
    }))
}

async fn add_security_event(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<SecurityEventRequest>,
) -> Result<StatusCode, ApiError> {
    let mut scorer = state.scorer.write().await;
    scorer.add_security_event(
        &device_id,
        &request.event_type,
        request.severity,
        &request.description,
    )?;

    Ok(StatusCode::CREATED)
}

async fn record_location(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(request): Json<RecordLocationRequest>,
) -> Result<StatusCode, ApiError> {
    let location = GeoLocation {
        city: request.city,
        latitude: request.latitude,
        longitude: request.longitude,
        timestamp: chrono::Utc::now(),
    };

    let mut scorer = state.scorer.write().await;
    scorer.record_location(&device_id, location)?;

    Ok(StatusCode::CREATED)
}

async fn create_assessment(
    State(state): State<AppState>,
    Json(request): Json<AssessRiskRequest>,
) -> Result<(StatusCode, Json<AssessRiskResponse>), ApiError> {
    require_device_id(&request.device_id)?;

    let assessment = state.calculator.calculate_risk(
        &request.device_id,
        &request.metrics,
        request.historical_data.as_ref(),
        request.network_reputation.as_ref(),
    );
    let risk_category = state
        .calculator
        .get_risk_category(assessment.overall_risk_score);

    Ok((
        StatusCode::CREATED,
        Json(AssessRiskResponse {
            risk_category: risk_category.to_string(),
            assessment,
        }),
    ))
}

async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<(StatusCode, Json<QuoteResponse>), ApiError> {
    require_device_id(&request.device_id)?;

    if let Some(score) = request.reputation_score {
        if !validate_unit_score(score) {
            return Err(validation_error("reputation_score must lie in [0, 1]"));
        }
    }

    // Quotes are only issued for registered devices
    {
        let scorer = state.scorer.read().await;
        if scorer.get_profile(&request.device_id).is_none() {
            return Err(ApiError(
                securepremium_common::ScoringError::DeviceNotFound(request.device_id.clone())
                    .into(),
            ));
        }
    }

    let assessment =
        state
            .calculator
            .calculate_risk(&request.device_id, &request.metrics, None, None);
    let risk_category = state
        .calculator
        .get_risk_category(assessment.overall_risk_score);

    // Explicit score wins; otherwise the network's decayed reputation
    let reputation_score = match request.reputation_score {
        Some(score) => Some(score),
        None => {
            let mut network = state.network.write().await;
            network
                .query_device_reputation(&request.device_id)
                .map(|record| record.reputation_score)
        }
    };

    let mut quote = state.engine.generate_quote(
        &request.device_id,
        &assessment,
        reputation_score,
        &request.coverage_level,
        request.policy_duration_months,
    )?;

    if let Some(device_count) = request.device_count {
        quote = state.engine.apply_volume_discount(&quote, device_count);
    }

    Ok((
        StatusCode::CREATED,
        Json(QuoteResponse {
            quote,
            risk_category: risk_category.to_string(),
        }),
    ))
}

async fn register_participant(
    State(state): State<AppState>,
    Json(request): Json<RegisterParticipantRequest>,
) -> Result<(StatusCode, Json<RegisterParticipantResponse>), ApiError> {
    if request.participant_id.is_empty() {
        return Err(validation_error("participant_id must not be empty"));
    }

    let mut network = state.network.write().await;
    let newly_registered = network.register_participant(&request.participant_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterParticipantResponse {
            participant_id: request.participant_id,
            newly_registered,
        }),
    ))
}

async fn report_threat(
    State(state): State<AppState>,
    Json(request): Json<ThreatReportRequest>,
) -> Result<(StatusCode, Json<securepremium_reputation::ThreatIntelligenceReport>), ApiError> {
    require_device_id(&request.device_id)?;

    if hex::decode(&request.evidence_hash).is_err() {
        return Err(validation_error("evidence_hash must be a hex digest"));
    }

    let mut network = state.network.write().await;
    let report = network.submit_threat_report(
        &request.reporter_id,
        &request.device_id,
        &request.threat_type,
        request.severity,
        &request.description,
        &request.evidence_hash,
    )?;

    Ok((StatusCode::CREATED, Json(report)))
}

async fn get_reputation(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Json<ReputationResponse> {
    let mut network = state.network.write().await;
    let risk_level = network.get_device_risk_level(&device_id);
    let reputation = network
        .query_device_reputation(&device_id)
        .map(|record| record.view());

    Json(ReputationResponse {
        device_id,
        risk_level: risk_level.to_string(),
        reputation,
    })
}

async fn get_threat_summary(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<ThreatIntelligenceSummary>, ApiError> {
    let mut network = state.network.write().await;

    network
        .get_threat_intelligence_summary(&device_id)
        .map(Json)
        .ok_or_else(|| {
            ApiError(
                securepremium_common::ReputationError::DeviceNotTracked(device_id.clone()).into(),
            )
        })
}

// ============ ROUTER ============

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(get_stats))
        // Devices
        .route("/api/devices", post(register_device))
        .route("/api/devices/:device_id/score", get(get_device_score))
        .route("/api/devices/:device_id/events", post(add_security_event))
        .route("/api/devices/:device_id/locations", post(record_location))
        // Risk
        .route("/api/assessments", post(create_assessment))
        // Premiums
        .route("/api/premiums", post(create_quote))
        // Reputation network
        .route("/api/participants", post(register_participant))
        .route("/api/threats", post(report_threat))
        .route("/api/threats/device/:device_id", get(get_threat_summary))
        .route("/api/reputation/:device_id", get(get_reputation))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ MAIN ============

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_gateway=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let state = AppState::new();
    let app = build_router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);
    info!("SecurePremium API Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

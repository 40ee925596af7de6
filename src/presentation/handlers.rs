// HTTP request handlers
use crate::application::chart_service::{
    AgentStatusRequest, SampleRequest, SampledChart, ServiceError,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Sample a caller-supplied series into a fixed-size chart
pub async fn sample_chart(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SampleRequest>,
) -> Result<Json<SampledChart>, ServiceError> {
    let chart = state.chart_service.sample(request).await?;
    tracing::debug!("Returning sampled chart with {} points", chart.chart.len());
    Ok(Json(chart))
}

/// Chart agent life-cycle states over a range
pub async fn agent_status_chart(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AgentStatusRequest>,
) -> Result<Json<SampledChart>, ServiceError> {
    let chart = state.chart_service.agent_status_chart(request).await?;
    tracing::debug!("Returning agent status chart with {} points", chart.chart.len());
    Ok(Json(chart))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Configuration(_) => {
                tracing::warn!("Rejected chart request: {}", self);
                StatusCode::BAD_REQUEST
            }
            ServiceError::Task(_) => {
                tracing::error!("Chart sampling failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_service::ChartService;
    use crate::infrastructure::config::SamplingSettings;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            chart_service: ChartService::new(SamplingSettings::default()).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_sample_chart_returns_every_slot() {
        let request = serde_json::from_value(json!({
            "kind": "long", "from": 0, "to": 4000, "slotSize": 1000, "default": -1,
            "observations": []
        }))
        .unwrap();

        let Json(chart) = sample_chart(State(state()), Json(request)).await.unwrap();
        let body = serde_json::to_value(&chart).unwrap();
        let timestamps: Vec<i64> = body["points"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["timestamp"].as_i64().unwrap())
            .collect();
        assert_eq!(timestamps, vec![0, 1_000, 2_000, 3_000]);
        assert!(body["points"].as_array().unwrap().iter().all(|p| p["value"] == -1));
    }

    #[tokio::test]
    async fn test_oversized_window_maps_to_bad_request() {
        let request = serde_json::from_value(json!({
            "kind": "double", "from": 0, "to": i64::MAX, "slotSize": 1
        }))
        .unwrap();

        let err = sample_chart(State(state()), Json(request)).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_status_chart_handler() {
        let request = serde_json::from_value(json!({
            "from": 0, "to": 2000, "slotSize": 1000,
            "statuses": [{"agentId": "app-1", "eventTimestamp": 1200, "state": "RUNNING"}]
        }))
        .unwrap();

        let Json(chart) = agent_status_chart(State(state()), Json(request)).await.unwrap();
        assert_eq!(chart.slot_size, 1_000);
        assert_eq!(chart.chart.len(), 2);
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }
}

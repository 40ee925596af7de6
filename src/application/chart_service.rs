// Chart service - Use case for turning caller-supplied series into sampled charts
use crate::application::sampler::SampledTimeSeriesChartBuilder;
use crate::domain::agent_status::{AgentLifeCycleState, AgentStatus};
use crate::domain::chart::{Chart, Observation};
use crate::domain::error::ConfigurationError;
use crate::domain::sample::{MinMaxLast, Reducer, Reduction, Sample};
use crate::domain::time_window::{FixedTimeWindow, Range, SlotSizeSampler, TimeWindow};
use crate::infrastructure::config::SamplingSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("sampling task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest<Y> {
    pub from: i64,
    pub to: i64,
    #[serde(default)]
    pub slot_size: Option<i64>,
    #[serde(default)]
    pub reduction: Reduction,
    #[serde(default)]
    pub default: Option<Y>,
    #[serde(default)]
    pub observations: Vec<Observation<Y>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SampleRequest {
    Long(SeriesRequest<i64>),
    Double(SeriesRequest<f64>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusRequest {
    pub from: i64,
    pub to: i64,
    #[serde(default)]
    pub slot_size: Option<i64>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub statuses: Vec<AgentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesChart {
    Long(Chart<i64>),
    Double(Chart<f64>),
}

impl SeriesChart {
    pub fn len(&self) -> usize {
        match self {
            SeriesChart::Long(chart) => chart.len(),
            SeriesChart::Double(chart) => chart.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledChart {
    pub slot_size: i64,
    #[serde(flatten)]
    pub chart: SeriesChart,
}

#[derive(Debug, Clone)]
pub struct ChartService {
    settings: SamplingSettings,
    slot_sampler: SlotSizeSampler,
}

impl ChartService {
    pub fn new(settings: SamplingSettings) -> Result<Self, ConfigurationError> {
        let slot_sampler =
            SlotSizeSampler::new(settings.min_slot_size_ms, settings.ideal_slot_count)?;
        Ok(Self {
            settings,
            slot_sampler,
        })
    }

    /// Resolves the display window for a request. Without an explicit slot
    /// size one is picked to keep the chart near the ideal point count.
    pub fn window(
        &self,
        from: i64,
        to: i64,
        slot_size: Option<i64>,
    ) -> Result<FixedTimeWindow, ConfigurationError> {
        let range = Range::new(from, to)?;
        let window = match slot_size {
            Some(size) => FixedTimeWindow::new(range, size)?,
            None => self.slot_sampler.window(range)?,
        };

        if window.slot_count() > self.settings.max_slot_count {
            return Err(ConfigurationError::SlotLimitExceeded {
                slots: window.slot_count(),
                limit: self.settings.max_slot_count,
            });
        }

        Ok(window)
    }

    pub async fn sample(&self, request: SampleRequest) -> Result<SampledChart, ServiceError> {
        match request {
            SampleRequest::Long(series) => {
                let default = series.default.unwrap_or(self.settings.fill_value);
                let (slot_size, chart) = self.sample_series(series, default).await?;
                Ok(SampledChart {
                    slot_size,
                    chart: SeriesChart::Long(chart),
                })
            }
            SampleRequest::Double(series) => {
                let default = series.default.unwrap_or(self.settings.fill_value as f64);
                let (slot_size, chart) = self.sample_series(series, default).await?;
                Ok(SampledChart {
                    slot_size,
                    chart: SeriesChart::Double(chart),
                })
            }
        }
    }

    /// Charts agent life-cycle state codes. Each slot reports the latest
    /// state seen in it; slots without events report `Unknown`.
    pub async fn agent_status_chart(
        &self,
        request: AgentStatusRequest,
    ) -> Result<SampledChart, ServiceError> {
        let window = self.window(request.from, request.to, request.slot_size)?;
        let slot_size = window.slot_size();

        let mut statuses: Vec<AgentStatus> = match &request.agent_id {
            Some(agent_id) => request
                .statuses
                .into_iter()
                .filter(|status| &status.agent_id == agent_id)
                .collect(),
            None => request.statuses,
        };
        statuses.sort_by_key(|status| status.event_timestamp);
        let observations: Vec<Observation<i64>> =
            statuses.iter().map(AgentStatus::to_observation).collect();

        tracing::debug!(
            "Charting {} agent status events into {} slots of {}ms",
            observations.len(),
            window.slot_count(),
            slot_size
        );

        let chart = run_sampler(
            window,
            AgentLifeCycleState::Unknown.code(),
            MinMaxLast,
            observations,
        )
        .await?;

        Ok(SampledChart {
            slot_size,
            chart: SeriesChart::Long(chart),
        })
    }

    async fn sample_series<Y: Sample>(
        &self,
        series: SeriesRequest<Y>,
        default: Y,
    ) -> Result<(i64, Chart<Y>), ServiceError> {
        let window = self.window(series.from, series.to, series.slot_size)?;
        let reduction = series.reduction.validate()?;
        let slot_size = window.slot_size();

        tracing::debug!(
            "Sampling {} observations into {} slots of {}ms from {} with {:?}",
            series.observations.len(),
            window.slot_count(),
            slot_size,
            window.start(),
            reduction
        );

        let chart = run_sampler(window, default, reduction, series.observations).await?;
        Ok((slot_size, chart))
    }
}

/// Builds the chart on the blocking pool. The call owns its window, buffers
/// and observations, so nothing is shared with concurrent requests.
async fn run_sampler<Y, R>(
    window: FixedTimeWindow,
    default: Y,
    reducer: R,
    observations: Vec<Observation<Y>>,
) -> Result<Chart<Y>, ServiceError>
where
    Y: Sample,
    R: Reducer<Y> + 'static,
{
    let chart = tokio::task::spawn_blocking(move || {
        SampledTimeSeriesChartBuilder::new(&window, default, reducer)
            .map(|builder| builder.build(observations))
    })
    .await??;
    Ok(chart)
}

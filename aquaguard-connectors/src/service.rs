//! Request/response surface over the pipeline
//!
//! [`AnalysisService`] is what an HTTP handler or the CLI calls. Each
//! request builds a fresh pipeline, so overrides in one request never leak
//! into the next, and every outcome (errors included) comes back as an
//! [`AnalyzeResponse`] with a status code.
//!
//! Each request runs under its own [`CancelToken`], a child of the
//! service's shutdown token. A timed-out request is cancelled alone; a
//! shutdown cancels everything in flight and rejects later requests.

use serde::{Deserialize, Serialize};

use aquaguard_core::time::{SystemTime, TimeSource};
use aquaguard_core::{CancelToken, ForecastError, ReadingSequence, Timestamp};
use aquaguard_ml::{
    plan_maintenance, AnomalySummary, ForecastPipeline, LstmTrainer, MaintenanceLimits, MaintenancePlan,
    PipelineConfig, Trainer,
};

use crate::ambient::{resolve_ambient, AmbientSource};
use crate::source::ReadingSource;
use crate::ConnectorError;

/// Body rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// The human-readable report
    #[default]
    Text,
    Json,
}

impl ResponseFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain; charset=utf-8",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// Per-request overrides of the service's base configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub time_step: Option<usize>,
    pub train_size: Option<usize>,
    pub horizon: Option<usize>,
    #[serde(default)]
    pub format: ResponseFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    /// Last service date; the earliest reading when unknown
    pub last_maintenance: Option<Timestamp>,
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Status code plus rendered body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzeResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl AnalyzeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn ok(format: ResponseFormat, body: String) -> Self {
        Self {
            status: 200,
            content_type: format.content_type(),
            body,
        }
    }

    fn error(format: ResponseFormat, status: u16, message: String) -> Self {
        let body = match format {
            ResponseFormat::Text => message,
            ResponseFormat::Json => serde_json::json!({ "status": status, "error": message }).to_string(),
        };
        Self {
            status,
            content_type: format.content_type(),
            body,
        }
    }
}

/// Status code and message for a failed request
pub fn status_for(err: &ConnectorError) -> (u16, String) {
    if let Some(forecast) = err.as_forecast_error() {
        return match forecast {
            ForecastError::InsufficientData { required, .. } => {
                (400, format!("Warning: less than {} records available.", required))
            }
            ForecastError::InvalidConfig { .. } => (400, forecast.to_string()),
            ForecastError::MalformedReading { .. } | ForecastError::DegenerateInput { .. } => {
                (422, forecast.to_string())
            }
            ForecastError::Cancelled { .. } => (503, forecast.to_string()),
            _ => (500, forecast.to_string()),
        };
    }

    match err {
        ConnectorError::Config(_) => (500, err.to_string()),
        _ => (502, err.to_string()),
    }
}

/// Owns the collaborators of a run and answers requests
pub struct AnalysisService<S, A, T> {
    source: S,
    ambient: A,
    trainer: T,
    config: PipelineConfig,
    limits: MaintenanceLimits,
    clock: Box<dyn TimeSource + Send + Sync>,
    shutdown: CancelToken,
}

impl<S: ReadingSource, A: AmbientSource> AnalysisService<S, A, LstmTrainer> {
    /// Service training an LSTM with `config.training`
    pub fn lstm(source: S, ambient: A, config: PipelineConfig) -> Self {
        let trainer = LstmTrainer::new(config.training.clone());
        Self::new(source, ambient, trainer, config)
    }
}

impl<S, A, T> AnalysisService<S, A, T>
where
    S: ReadingSource,
    A: AmbientSource,
    T: Trainer + Clone,
{
    pub fn new(source: S, ambient: A, trainer: T, config: PipelineConfig) -> Self {
        Self {
            source,
            ambient,
            trainer,
            config,
            limits: MaintenanceLimits::default(),
            clock: Box::new(SystemTime),
            shutdown: CancelToken::new(),
        }
    }

    pub fn with_limits(mut self, limits: MaintenanceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Clock used to stamp maintenance reports
    pub fn with_clock(mut self, clock: impl TimeSource + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_shutdown_token(mut self, shutdown: CancelToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that cancels in-flight and all future requests
    pub fn shutdown_token(&self) -> CancelToken {
        self.shutdown.clone()
    }

    /// Token for one request; cancelling it leaves other requests alone
    pub fn request_token(&self) -> CancelToken {
        self.shutdown.child()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Base configuration with the request's overrides applied
    pub fn config_for(&self, request: &AnalyzeRequest) -> PipelineConfig {
        let mut config = self.config.clone();
        if let Some(time_step) = request.time_step {
            config = config.with_time_step(time_step);
        }
        if let Some(train_size) = request.train_size {
            config = config.with_train_size(train_size);
        }
        if let Some(horizon) = request.horizon {
            config = config.with_horizon(horizon);
        }
        config
    }

    /// Run the forecast-and-compare pipeline once
    pub fn analyze(&self, request: &AnalyzeRequest) -> AnalyzeResponse {
        self.analyze_with(request, &self.request_token())
    }

    /// [`AnalysisService::analyze`] under a caller-held token
    ///
    /// Take the token from [`AnalysisService::request_token`] so the run
    /// also stops on shutdown.
    pub fn analyze_with(&self, request: &AnalyzeRequest, cancel: &CancelToken) -> AnalyzeResponse {
        let format = request.format;
        let result = self.run_analysis(&self.config_for(request), cancel).and_then(|summary| {
            match format {
                ResponseFormat::Text => Ok(summary.render_text()),
                ResponseFormat::Json => summary
                    .to_json()
                    .map_err(|e| ConnectorError::Config(format!("cannot render summary: {}", e))),
            }
        });

        match result {
            Ok(body) => AnalyzeResponse::ok(format, body),
            Err(err) => self.failure(format, &err),
        }
    }

    /// Project the next maintenance date
    pub fn maintenance(&self, request: &MaintenanceRequest) -> AnalyzeResponse {
        let format = request.format;
        let result = self.plan(request.last_maintenance).and_then(|plan| match format {
            ResponseFormat::Text => Ok(plan.to_string()),
            ResponseFormat::Json => plan
                .to_json()
                .map_err(|e| ConnectorError::Config(format!("cannot render plan: {}", e))),
        });

        match result {
            Ok(body) => AnalyzeResponse::ok(format, body),
            Err(err) => self.failure(format, &err),
        }
    }

    fn run_analysis(
        &self,
        config: &PipelineConfig,
        cancel: &CancelToken,
    ) -> Result<AnomalySummary, ConnectorError> {
        config.validate()?;
        cancel.check("loading")?;
        let sequence = self.load()?;

        let ambient = resolve_ambient(&self.ambient);
        let pipeline = ForecastPipeline::new(config.clone(), self.trainer.clone());
        let run = pipeline.run(&sequence, ambient, cancel)?;
        Ok(run.summary)
    }

    fn plan(&self, last_maintenance: Option<Timestamp>) -> Result<MaintenancePlan, ConnectorError> {
        self.shutdown.check("maintenance")?;
        let sequence = self.load()?;
        Ok(plan_maintenance(&sequence, last_maintenance, &self.limits, self.clock.now())?)
    }

    fn load(&self) -> Result<ReadingSequence, ConnectorError> {
        let readings = self.source.fetch()?;
        log::info!("Loaded {} readings from {}", readings.len(), self.source.describe());
        Ok(ReadingSequence::from_readings(readings)?)
    }

    fn failure(&self, format: ResponseFormat, err: &ConnectorError) -> AnalyzeResponse {
        let (status, message) = status_for(err);
        if status >= 500 {
            log::warn!("Request failed with {}: {}", status, err);
        } else {
            log::info!("Request rejected with {}: {}", status, err);
        }
        AnalyzeResponse::error(format, status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::FixedAmbient;
    use crate::source::MemorySource;
    use aquaguard_core::Reading;
    use aquaguard_ml::NaiveTrainer;

    fn service(readings: Vec<Reading>) -> AnalysisService<MemorySource, FixedAmbient, NaiveTrainer> {
        AnalysisService::new(
            MemorySource::new(readings),
            FixedAmbient(20.0),
            NaiveTrainer,
            PipelineConfig::default(),
        )
    }

    #[test]
    fn overrides_apply_per_request() {
        let service = service(Vec::new());
        let request = AnalyzeRequest {
            horizon: Some(30),
            ..Default::default()
        };

        assert_eq!(service.config_for(&request).horizon, 30);
        assert_eq!(service.config().horizon, 120);
    }

    #[test]
    fn invalid_override_is_bad_request() {
        let service = service(Vec::new());
        let request = AnalyzeRequest {
            time_step: Some(0),
            ..Default::default()
        };
        assert_eq!(service.analyze(&request).status, 400);
    }

    #[test]
    fn json_errors_are_json() {
        let service = service(Vec::new());
        let response = service.analyze(&AnalyzeRequest {
            format: ResponseFormat::Json,
            ..Default::default()
        });

        assert_eq!(response.content_type, "application/json");
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Warning: less than 500 records available.");
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (ForecastError::MalformedReading { index: 3, reason: "x".into() }, 422),
            (ForecastError::DegenerateInput { feature: None, reason: "empty" }, 422),
            (ForecastError::Cancelled { stage: "training" }, 503),
            (ForecastError::Training { reason: "diverged".into() }, 500),
            (ForecastError::InsufficientData { required: 500, available: 1 }, 400),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&ConnectorError::Forecast(err)).0, status);
        }

        let io = ConnectorError::Io {
            path: "/x".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(status_for(&io).0, 502);
    }

    #[test]
    fn request_tokens_are_independent() {
        let service = service(Vec::new());
        let first = service.request_token();
        first.cancel();

        assert_eq!(service.analyze_with(&AnalyzeRequest::default(), &first).status, 503);
        assert!(!service.request_token().is_cancelled());
        assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 400);
    }

    #[test]
    fn shutdown_rejects_everything() {
        let service = service(Vec::new());
        let in_flight = service.request_token();
        service.shutdown_token().cancel();

        assert!(in_flight.is_cancelled());
        assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 503);
        assert_eq!(service.maintenance(&MaintenanceRequest::default()).status, 503);
    }
}

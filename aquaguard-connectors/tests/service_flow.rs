//! Service requests over file-backed readings

mod common;

use aquaguard_connectors::ambient::{FixedAmbient, UnconfiguredAmbient};
use aquaguard_connectors::service::{AnalysisService, AnalyzeRequest, MaintenanceRequest, ResponseFormat};
use aquaguard_connectors::source::{AvroFileSource, JsonFileSource};
use aquaguard_core::time::FixedTime;
use aquaguard_ml::{NaiveTrainer, PipelineConfig};
use aquaguard_schemas::{avro, decode_documents, schemas::water_reading_v1};
use common::*;
use serde_json::{json, Value};

fn small_config() -> PipelineConfig {
    PipelineConfig::default().with_time_step(5).with_train_size(60).with_horizon(20)
}

fn file_service(
    dir: &tempfile::TempDir,
    docs: &[Value],
    config: PipelineConfig,
) -> AnalysisService<JsonFileSource, FixedAmbient, NaiveTrainer> {
    let path = write_export(dir.path(), docs);
    AnalysisService::new(JsonFileSource::new(path), FixedAmbient(35.0), NaiveTrainer, config)
}

#[test]
fn text_report_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(80), small_config());

    let response = service.analyze(&AnalyzeRequest::default());
    assert_eq!(response.status, 200);
    assert!(response.content_type.starts_with("text/plain"));
    assert!(response.body.starts_with("Ambient Temperature (from API): 35 °C"));
    assert!(response.body.contains("Dynamic Temperature Anomaly Threshold: 5.0 °C"));
    assert!(response.body.contains("Anomaly Summary:"));
}

#[test]
fn json_report_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(80), small_config());

    let response = service.analyze(&AnalyzeRequest {
        format: ResponseFormat::Json,
        ..Default::default()
    });
    assert_eq!(response.status, 200);

    let summary: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(summary["ambient_source"], "lookup");
    assert_eq!(summary["temperature_threshold"], 5.0);
    assert_eq!(summary["compared"], 20);
}

#[test]
fn too_few_records_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(400), PipelineConfig::default());

    let response = service.analyze(&AnalyzeRequest::default());
    assert_eq!(response.status, 400);
    assert_eq!(response.body, "Warning: less than 500 records available.");
}

#[test]
fn request_overrides_shrink_the_requirement() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(100), PipelineConfig::default());

    let response = service.analyze(&AnalyzeRequest {
        time_step: Some(5),
        train_size: Some(60),
        horizon: Some(30),
        format: ResponseFormat::Text,
    });
    assert_eq!(response.status, 200);
}

#[test]
fn malformed_document_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let mut docs = store_documents(80);
    docs[41]["Flow_rate"] = json!("high");
    let service = file_service(&dir, &docs, small_config());

    let response = service.analyze(&AnalyzeRequest::default());
    assert_eq!(response.status, 422);
    assert!(response.body.contains("index 41"));
}

#[test]
fn missing_export_is_bad_gateway() {
    let service = AnalysisService::new(
        JsonFileSource::new("/nonexistent/export.json"),
        FixedAmbient(20.0),
        NaiveTrainer,
        small_config(),
    );
    assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 502);
}

#[test]
fn cancelled_request_leaves_the_next_one_alone() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(80), small_config());

    let timed_out = service.request_token();
    timed_out.cancel();
    assert_eq!(service.analyze_with(&AnalyzeRequest::default(), &timed_out).status, 503);

    assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 200);
    assert_eq!(service.maintenance(&MaintenanceRequest::default()).status, 200);
}

#[test]
fn shut_down_service_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(80), small_config());
    service.shutdown_token().cancel();

    assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 503);
    assert_eq!(service.maintenance(&MaintenanceRequest::default()).status, 503);
}

#[test]
fn failed_lookup_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_export(dir.path(), &store_documents(80));
    let service = AnalysisService::new(
        JsonFileSource::new(path),
        UnconfiguredAmbient::default(),
        NaiveTrainer,
        small_config(),
    );

    let response = service.analyze(&AnalyzeRequest {
        format: ResponseFormat::Json,
        ..Default::default()
    });
    let summary: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(summary["ambient"], 20.0);
    assert_eq!(summary["ambient_source"], "default");
    assert_eq!(summary["temperature_threshold"], 2.0);
}

#[test]
fn avro_archive_source() {
    let dir = tempfile::tempdir().unwrap();
    let readings = decode_documents(&store_documents(80)).unwrap();
    let path = dir.path().join("readings.avro");
    std::fs::write(&path, avro::encode_readings(&water_reading_v1().unwrap(), &readings).unwrap()).unwrap();

    let service = AnalysisService::new(AvroFileSource::new(path), FixedAmbient(20.0), NaiveTrainer, small_config());
    assert_eq!(service.analyze(&AnalyzeRequest::default()).status, 200);
}

#[test]
fn maintenance_report() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(80), small_config()).with_clock(FixedTime::new(START_MS));

    let response = service.maintenance(&MaintenanceRequest::default());
    assert_eq!(response.status, 200);
    assert!(response.body.contains("Last maintenance timestamp: 2024-01-01 00:00:00"));
    assert!(
        response.body.contains("Maintenance Recommendation:")
            || response.body.contains("No maintenance needed based on current trends.")
    );
    assert!(response.body.contains("Time (current local time): 2024-01-01 00:00:00"));
}

#[test]
fn maintenance_after_last_reading_needs_data() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(&dir, &store_documents(10), small_config());

    let response = service.maintenance(&MaintenanceRequest {
        last_maintenance: Some(START_MS + 1_000 * 3_600_000),
        format: ResponseFormat::Text,
    });
    assert_eq!(response.status, 400);
}

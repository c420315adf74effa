//! Schema-Based Validation
//!
//! Checks an Avro value against the reading schema and the sensor operating
//! ranges. Structural problems are errors; range problems are warnings.

use apache_avro::{types::Value, Schema};
use serde::Serialize;

use aquaguard_core::Feature;

use crate::avro::numeric;
use crate::physics::FeatureLimits;
use crate::schemas::WATER_READING_FIELDS;
use crate::SchemaError;

/// Validator combining Avro structure checks with operating ranges
pub struct SchemaValidator {
    schema: Schema,
    limits: FeatureLimits,
}

impl SchemaValidator {
    /// Validator with the default operating ranges
    pub fn new(schema: Schema) -> Self {
        Self::with_limits(schema, FeatureLimits::default())
    }

    pub fn with_limits(schema: Schema, limits: FeatureLimits) -> Self {
        Self { schema, limits }
    }

    /// Validate one record
    pub fn validate(&self, value: &Value) -> Result<ValidationReport, SchemaError> {
        let mut report = ValidationReport::new();

        let fields = match value {
            Value::Record(fields) => fields,
            _ => {
                report.add_error(ValidationIssue::error(
                    IssueType::TypeMismatch,
                    None,
                    "Expected record type".to_string(),
                ));
                return Ok(report);
            }
        };

        if !value.validate(&self.schema) {
            report.add_error(ValidationIssue::error(
                IssueType::TypeMismatch,
                None,
                "Record does not match the reading schema".to_string(),
            ));
        }

        for name in WATER_READING_FIELDS {
            if !fields.iter().any(|(field, _)| field == name) {
                report.add_error(ValidationIssue::error(
                    IssueType::MissingField,
                    Some(name),
                    format!("Required field '{}' is missing", name),
                ));
            }
        }

        for feature in Feature::ALL {
            let Some((_, field)) = fields.iter().find(|(name, _)| name == feature.name()) else {
                continue;
            };
            match numeric(field) {
                Some(v) if v.is_finite() => {
                    let range = self.limits.range(feature);
                    if !range.contains(v) {
                        report.add_warning(ValidationIssue {
                            issue_type: IssueType::OutOfRange,
                            field: Some(feature.name().to_string()),
                            index: None,
                            message: format!(
                                "{} {} outside operating range [{}, {}]",
                                feature.name(),
                                v,
                                range.min,
                                range.max
                            ),
                            severity: Severity::Warning,
                        });
                    }
                }
                Some(v) => report.add_error(ValidationIssue::error(
                    IssueType::NonFinite,
                    Some(feature.name()),
                    format!("{} is {}", feature.name(), v),
                )),
                None => report.add_error(ValidationIssue::error(
                    IssueType::TypeMismatch,
                    Some(feature.name()),
                    format!("{} is not numeric", feature.name()),
                )),
            }
        }

        Ok(report)
    }
}

/// Validation report containing all issues found
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    /// Validation errors (the record cannot be used)
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (should be reviewed)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub issue_type: IssueType,

    /// Field that caused the issue (if applicable)
    pub field: Option<String>,

    /// Position of the record in its batch
    pub index: Option<usize>,

    /// Human-readable message
    pub message: String,

    pub severity: Severity,
}

impl ValidationIssue {
    fn error(issue_type: IssueType, field: Option<&str>, message: String) -> Self {
        Self {
            issue_type,
            field: field.map(str::to_string),
            index: None,
            message,
            severity: Severity::Error,
        }
    }
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Required field is missing
    MissingField,

    /// Type doesn't match schema
    TypeMismatch,

    /// NaN or infinite measurement
    NonFinite,

    /// Outside the sensor's operating range
    OutOfRange,
}

/// Issue severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

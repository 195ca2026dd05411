//! Applying operations to a schema-management API.
//!
//! The transport is abstracted behind [`SchemaBackend`]; this module only
//! builds payloads, classifies responses and keeps the tally. Indexes are
//! created by the target system itself, so [`Change::CreateIndex`] is
//! logged and counted as skipped.

use core::fmt::{self, Display};

use indexmap::IndexMap;
use serde::Serialize;

use crate::operation::{Change, Operation};
use crate::sql::{FieldType, Literal, NormalizedType, UiInterface};

/// The `meta` object of a field payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
    /// Editor widget.
    pub interface: UiInterface,
}

/// The `schema` object of a field payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Database column name.
    pub name: String,
}

/// Request body creating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPayload {
    /// Field name.
    pub field: String,
    /// Normalized field type.
    #[serde(rename = "type")]
    pub field_type: NormalizedType,
    /// UI metadata, absent when the type has no interface hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FieldMeta>,
    /// Column metadata.
    pub schema: FieldSchema,
}

impl FieldPayload {
    /// Build the payload for `column` of type `field_type`.
    #[must_use]
    pub fn new(column: &str, field_type: FieldType) -> Self {
        Self {
            field: column.into(),
            field_type: field_type.normalized,
            meta: field_type
                .interface
                .map(|interface| FieldMeta { interface }),
            schema: FieldSchema {
                name: column.into(),
            },
        }
    }
}

/// Request body creating one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPayload<'a> {
    /// Column to value.
    pub data: &'a IndexMap<String, Literal>,
}

/// A request derived from an operation, ready for a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request<'a> {
    /// `POST` a field to `fields/<collection>`.
    CreateField {
        /// Endpoint path.
        path: String,
        /// Request body.
        body: FieldPayload,
    },
    /// `POST` a record to `items/<collection>`.
    CreateRecord {
        /// Endpoint path.
        path: String,
        /// Request body.
        body: RecordPayload<'a>,
    },
    /// Nothing to send.
    Skip {
        /// Why nothing is sent.
        reason: String,
    },
}

impl<'a> Request<'a> {
    /// The request an operation maps to.
    #[must_use]
    pub fn for_operation(operation: &'a Operation) -> Self {
        match &operation.change {
            Change::AddColumn {
                column, field_type, ..
            } => Request::CreateField {
                path: fields_path(&operation.table),
                body: FieldPayload::new(column, *field_type),
            },
            Change::InsertData { data } => Request::CreateRecord {
                path: items_path(&operation.table),
                body: RecordPayload { data },
            },
            Change::CreateIndex { index_name, .. } => Request::Skip {
                reason: skip_reason(index_name, &operation.table),
            },
        }
    }
}

fn skip_reason(index_name: &str, table: &str) -> String {
    format!("index {index_name} on {table} is created by the target system")
}

/// Endpoint creating fields of `collection`.
#[must_use]
pub fn fields_path(collection: &str) -> String {
    format!("/fields/{collection}")
}

/// Endpoint creating records of `collection`.
#[must_use]
pub fn items_path(collection: &str) -> String {
    format!("/items/{collection}")
}

/// What a backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl BackendResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// Returns true if the body is an error list whose first message says
    /// the resource already exists.
    #[must_use]
    pub fn reports_already_exists(&self) -> bool {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|body| {
                body.get("errors")?
                    .get(0)?
                    .get("message")?
                    .as_str()
                    .map(str::to_lowercase)
            })
            .is_some_and(|message| message.contains("already exists"))
    }
}

/// Transport for a schema-management API.
pub trait SchemaBackend {
    /// Transport-level error, e.g. a connection failure.
    type Error: Display;

    /// Send a field-creation request for `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered.
    fn create_field(
        &mut self,
        collection: &str,
        payload: &FieldPayload,
    ) -> Result<BackendResponse, Self::Error>;

    /// Send a record-creation request for `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered.
    fn create_record(
        &mut self,
        collection: &str,
        payload: &RecordPayload<'_>,
    ) -> Result<BackendResponse, Self::Error>;
}

/// How a single operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The change was made.
    Applied,
    /// The change was already present.
    AlreadyExists,
    /// Nothing had to be sent.
    Skipped,
    /// The change was rejected or could not be sent.
    Failed {
        /// Status and body, or the transport error.
        reason: String,
    },
}

impl Outcome {
    /// Returns true unless the operation failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

fn rejected(response: &BackendResponse) -> Outcome {
    Outcome::Failed {
        reason: format!("{} {}", response.status, response.body),
    }
}

/// Classify the answer to a field-creation request.
///
/// 200/201 is applied; 409, or 400 reporting "already exists", is already
/// present; anything else failed.
#[must_use]
pub fn classify_field_response(response: &BackendResponse) -> Outcome {
    match response.status {
        _ if response.is_success() => Outcome::Applied,
        409 => Outcome::AlreadyExists,
        400 if response.reports_already_exists() => Outcome::AlreadyExists,
        _ => rejected(response),
    }
}

/// Classify the answer to a record-creation request.
#[must_use]
pub fn classify_record_response(response: &BackendResponse) -> Outcome {
    if response.is_success() {
        Outcome::Applied
    } else {
        rejected(response)
    }
}

/// An operation that failed, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedOperation {
    /// The operation.
    pub operation: Operation,
    /// Why it failed.
    pub reason: String,
}

/// Tally of an [`apply`] run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Changes made.
    pub applied: usize,
    /// Changes that were already present.
    pub already_present: usize,
    /// Operations with nothing to send.
    pub skipped: usize,
    /// Operations that failed.
    pub failed: Vec<FailedOperation>,
}

impl ApplyReport {
    /// Number of operations that did not fail.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.applied + self.already_present + self.skipped
    }

    /// Total number of operations processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.failed.len()
    }

    /// Returns true if no operation failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, operation: Operation, outcome: Outcome) {
        match outcome {
            Outcome::Applied => self.applied += 1,
            Outcome::AlreadyExists => self.already_present += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed { reason } => self.failed.push(FailedOperation { operation, reason }),
        }
    }
}

impl Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded ({} applied, {} already present, {} skipped), {} failed, {} total",
            self.succeeded(),
            self.applied,
            self.already_present,
            self.skipped,
            self.failed.len(),
            self.total()
        )
    }
}

/// Send one operation to `backend` and classify the result.
pub fn apply_operation<B: SchemaBackend>(backend: &mut B, operation: &Operation) -> Outcome {
    let outcome = match &operation.change {
        Change::AddColumn {
            column, field_type, ..
        } => {
            let payload = FieldPayload::new(column, *field_type);
            backend
                .create_field(&operation.table, &payload)
                .map_or_else(
                    |err| Outcome::Failed {
                        reason: err.to_string(),
                    },
                    |response| classify_field_response(&response),
                )
        }
        Change::InsertData { data } => backend
            .create_record(&operation.table, &RecordPayload { data })
            .map_or_else(
                |err| Outcome::Failed {
                    reason: err.to_string(),
                },
                |response| classify_record_response(&response),
            ),
        Change::CreateIndex { index_name, .. } => {
            tracing::info!(
                index = %index_name,
                table = %operation.table,
                "index is created automatically, nothing to send"
            );
            Outcome::Skipped
        }
    };

    match &outcome {
        Outcome::Applied => tracing::info!(%operation, "applied"),
        Outcome::AlreadyExists => tracing::warn!(%operation, "already exists"),
        Outcome::Skipped => {}
        Outcome::Failed { reason } => tracing::error!(%operation, %reason, "failed"),
    }
    outcome
}

/// Apply every operation in order, consuming them.
///
/// A failure never stops the run; it is recorded in the report.
pub fn apply<B, I>(backend: &mut B, operations: I) -> ApplyReport
where
    B: SchemaBackend,
    I: IntoIterator<Item = Operation>,
{
    let mut report = ApplyReport::default();
    for operation in operations {
        let outcome = apply_operation(backend, &operation);
        report.record(operation, outcome);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::compile;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        fields: Vec<(String, serde_json::Value)>,
        records: Vec<(String, serde_json::Value)>,
        field_response: Option<BackendResponse>,
    }

    impl SchemaBackend for Recorder {
        type Error = &'static str;

        fn create_field(
            &mut self,
            collection: &str,
            payload: &FieldPayload,
        ) -> Result<BackendResponse, Self::Error> {
            self.fields
                .push((collection.into(), serde_json::to_value(payload).unwrap()));
            Ok(self
                .field_response
                .clone()
                .unwrap_or_else(|| BackendResponse::new(200, "{}")))
        }

        fn create_record(
            &mut self,
            collection: &str,
            payload: &RecordPayload<'_>,
        ) -> Result<BackendResponse, Self::Error> {
            self.records
                .push((collection.into(), serde_json::to_value(payload).unwrap()));
            Err("connection reset")
        }
    }

    #[test]
    fn test_field_payload_shape() {
        let payload = FieldPayload::new("is_active", crate::sql::map_type("BOOLEAN"));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "field": "is_active",
                "type": "boolean",
                "meta": {"interface": "boolean"},
                "schema": {"name": "is_active"},
            })
        );
    }

    #[test]
    fn test_field_payload_without_interface() {
        let payload = FieldPayload::new("count", crate::sql::map_type("INTEGER"));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"field": "count", "type": "integer", "schema": {"name": "count"}})
        );
    }

    #[test]
    fn test_classify_field_response() {
        assert_eq!(
            classify_field_response(&BackendResponse::new(201, "")),
            Outcome::Applied
        );
        assert_eq!(
            classify_field_response(&BackendResponse::new(409, "")),
            Outcome::AlreadyExists
        );
        assert_eq!(
            classify_field_response(&BackendResponse::new(
                400,
                r#"{"errors":[{"message":"Field \"x\" Already Exists in collection"}]}"#
            )),
            Outcome::AlreadyExists
        );
        let invalid = BackendResponse::new(400, r#"{"errors":[{"message":"Invalid payload"}]}"#);
        assert!(!classify_field_response(&invalid).is_success());
        assert!(!classify_field_response(&BackendResponse::new(400, "not json")).is_success());
        assert_eq!(
            classify_field_response(&BackendResponse::new(500, "boom")),
            Outcome::Failed {
                reason: "500 boom".into(),
            }
        );
    }

    #[test]
    fn test_classify_record_response() {
        assert_eq!(
            classify_record_response(&BackendResponse::new(200, "")),
            Outcome::Applied
        );
        assert!(!classify_record_response(&BackendResponse::new(409, "")).is_success());
    }

    #[test]
    fn test_apply_tallies_and_continues() {
        let ops = compile(
            "
            CREATE TABLE users (name TEXT);
            CREATE INDEX idx_users_name ON users (name);
            INSERT INTO users (name) VALUES ('Ann');
            ",
            "001.sql",
        );
        let mut backend = Recorder::default();
        let report = apply(&mut backend, ops);

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].reason, "connection reset");
        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());

        assert_eq!(backend.fields[0].0, "users");
        assert_eq!(
            backend.records,
            vec![("users".to_string(), json!({"data": {"name": "Ann"}}))]
        );
    }

    #[test]
    fn test_apply_already_exists() {
        let ops = compile("ALTER TABLE t ADD COLUMN a TEXT;", "001.sql");
        let mut backend = Recorder {
            field_response: Some(BackendResponse::new(409, "")),
            ..Recorder::default()
        };
        let report = apply(&mut backend, ops);
        assert_eq!(report.already_present, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_request_plan() {
        let ops = compile(
            "CREATE INDEX idx ON t (a); INSERT INTO t (a) VALUES (1);
             ALTER TABLE T ADD COLUMN Status VARCHAR(20);",
            "001.sql",
        );
        assert_eq!(
            serde_json::to_value(Request::for_operation(&ops[0])).unwrap(),
            json!({
                "action": "create_field",
                "path": "/fields/t",
                "body": {
                    "field": "status",
                    "type": "string",
                    "meta": {"interface": "input"},
                    "schema": {"name": "status"},
                },
            })
        );
        assert_eq!(
            serde_json::to_value(Request::for_operation(&ops[1])).unwrap(),
            json!({"action": "skip", "reason": "index idx on t is created by the target system"})
        );
        assert_eq!(
            serde_json::to_value(Request::for_operation(&ops[2])).unwrap(),
            json!({"action": "create_record", "path": "/items/t", "body": {"data": {"a": 1}}})
        );
    }
}

//! Mapping from raw SQL column types to normalized schema field types.

use core::fmt::{self, Display};

use serde::Serialize;

/// The target system's own field-type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedType {
    /// Short string.
    String,
    /// Long text.
    Text,
    /// Boolean flag.
    Boolean,
    /// Integer number.
    Integer,
    /// Date and time.
    Timestamp,
    /// Arbitrary JSON document.
    Json,
}

impl NormalizedType {
    /// The wire name of this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NormalizedType::String => "string",
            NormalizedType::Text => "text",
            NormalizedType::Boolean => "boolean",
            NormalizedType::Integer => "integer",
            NormalizedType::Timestamp => "timestamp",
            NormalizedType::Json => "json",
        }
    }
}

impl Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which editor widget the schema UI should use for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiInterface {
    /// Single-line text input.
    Input,
    /// Toggle.
    Boolean,
    /// Date/time picker.
    Datetime,
    /// Code editor.
    Code,
}

impl UiInterface {
    /// The wire name of this interface.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UiInterface::Input => "input",
            UiInterface::Boolean => "boolean",
            UiInterface::Datetime => "datetime",
            UiInterface::Code => "code",
        }
    }
}

impl Display for UiInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized descriptor of a column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldType {
    /// Normalized type name.
    #[serde(rename = "type")]
    pub normalized: NormalizedType,
    /// Optional UI hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<UiInterface>,
}

impl FieldType {
    /// Descriptor used for every unrecognized base type.
    pub const DEFAULT: Self = Self::new(NormalizedType::String, Some(UiInterface::Input));

    /// Create a new descriptor.
    #[must_use]
    pub const fn new(normalized: NormalizedType, interface: Option<UiInterface>) -> Self {
        Self {
            normalized,
            interface,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Extract the upper-cased base keyword of a SQL type, e.g. `VARCHAR` from
/// `varchar(255) not null`.
///
/// Returns an empty string if the type does not start with an identifier.
#[must_use]
pub fn base_type(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Map a raw SQL type (with or without parameters and trailing clauses)
/// onto a normalized [`FieldType`].
///
/// Total: unknown base types map to [`FieldType::DEFAULT`]. Input with no
/// leading identifier maps to `string` without an interface hint.
#[must_use]
pub fn map_type(raw: &str) -> FieldType {
    use NormalizedType as N;
    use UiInterface as I;

    match base_type(raw).as_str() {
        "" => FieldType::new(N::String, None),
        "VARCHAR" => FieldType::new(N::String, Some(I::Input)),
        "TEXT" => FieldType::new(N::Text, Some(I::Input)),
        "BOOLEAN" => FieldType::new(N::Boolean, Some(I::Boolean)),
        "INTEGER" | "SERIAL" => FieldType::new(N::Integer, None),
        "TIMESTAMP" => FieldType::new(N::Timestamp, Some(I::Datetime)),
        "JSONB" => FieldType::new(N::Json, Some(I::Code)),
        _ => FieldType::DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type() {
        assert_eq!(base_type("VARCHAR(255)"), "VARCHAR");
        assert_eq!(base_type("  timestamp with time zone"), "TIMESTAMP");
        assert_eq!(base_type("int4"), "INT4");
        assert_eq!(base_type("(oops)"), "");
    }

    #[test]
    fn test_known_types() {
        assert_eq!(
            map_type("VARCHAR(50)"),
            FieldType::new(NormalizedType::String, Some(UiInterface::Input))
        );
        assert_eq!(
            map_type("text"),
            FieldType::new(NormalizedType::Text, Some(UiInterface::Input))
        );
        assert_eq!(
            map_type("BOOLEAN DEFAULT FALSE"),
            FieldType::new(NormalizedType::Boolean, Some(UiInterface::Boolean))
        );
        assert_eq!(
            map_type("INTEGER"),
            FieldType::new(NormalizedType::Integer, None)
        );
        assert_eq!(map_type("serial"), map_type("INTEGER"));
        assert_eq!(
            map_type("TIMESTAMP DEFAULT NOW()"),
            FieldType::new(NormalizedType::Timestamp, Some(UiInterface::Datetime))
        );
        assert_eq!(
            map_type("JSONB"),
            FieldType::new(NormalizedType::Json, Some(UiInterface::Code))
        );
    }

    #[test]
    fn test_unknown_types_default() {
        for raw in ["UUID", "DOUBLE PRECISION", "NUMERIC(10,2)", "INT", "BIGINT"] {
            assert_eq!(map_type(raw), FieldType::DEFAULT, "{raw}");
        }
    }

    #[test]
    fn test_no_identifier() {
        assert_eq!(map_type(""), FieldType::new(NormalizedType::String, None));
        assert_eq!(map_type("  "), FieldType::new(NormalizedType::String, None));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            serde_json::to_value(map_type("JSONB")).unwrap(),
            serde_json::json!({"type": "json", "interface": "code"})
        );
        assert_eq!(
            serde_json::to_value(map_type("INTEGER")).unwrap(),
            serde_json::json!({"type": "integer"})
        );
    }
}

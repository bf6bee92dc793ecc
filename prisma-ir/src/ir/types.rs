//! Scalar type definitions.
//!
//! The set of column types is closed. Keeping it closed is what lets the
//! renderer map every column without a failure path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scalar type of a plain column.
///
/// Primary and foreign columns are always [`ScalarType::Uuid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// Boolean flag
    Boolean,

    /// Signed integer
    Int,

    /// Double precision float
    Double,

    /// Free text
    String,

    /// Text holding a URI
    Uri,

    /// Opaque 128-bit identifier
    Uuid,

    /// Timestamp with time zone
    Datetime,
}

impl ScalarType {
    /// All scalar types, in declaration order.
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Boolean,
        ScalarType::Int,
        ScalarType::Double,
        ScalarType::String,
        ScalarType::Uri,
        ScalarType::Uuid,
        ScalarType::Datetime,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int => "int",
            ScalarType::Double => "double",
            ScalarType::String => "string",
            ScalarType::Uri => "uri",
            ScalarType::Uuid => "uuid",
            ScalarType::Datetime => "datetime",
        }
    }

    /// Whether a full-text index may target a column of this type.
    pub fn is_text(&self) -> bool {
        matches!(self, ScalarType::String)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known scalar type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scalar type '{0}'")]
pub struct UnknownScalarType(pub String);

impl FromStr for ScalarType {
    type Err = UnknownScalarType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownScalarType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for ty in ScalarType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
            assert_eq!(ty.as_str().parse::<ScalarType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = "varchar".parse::<ScalarType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown scalar type 'varchar'");
        assert!(serde_json::from_str::<ScalarType>("\"varchar\"").is_err());
    }

    #[test]
    fn test_only_string_is_text() {
        let text: Vec<_> = ScalarType::ALL.into_iter().filter(|t| t.is_text()).collect();
        assert_eq!(text, vec![ScalarType::String]);
    }
}

//! Identifier and scalar type rules.
//!
//! Every other module asks these predicates what a valid name looks like,
//! so there is exactly one definition of "valid identifier" in the crate.

use std::sync::LazyLock;

use regex::Regex;

use crate::ir::ScalarType;

/// Model names, column names and index-participating field names.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("identifier pattern is valid"));

/// Relation property names. These name an access path, not a column.
static RELATION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("relation name pattern is valid")
});

/// `schema-{order}-{domain}.{ext}`
static COMPONENT_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^schema-[0-9]{2,}-[a-z0-9]+(?:-[a-z0-9]+)*\.[a-z]+$")
        .expect("component filename pattern is valid")
});

/// Check a model or column name: a lowercase ASCII letter followed by
/// lowercase letters, digits or underscores.
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Check a relation property name: a letter or underscore followed by
/// letters, digits or underscores, in any case.
pub fn is_valid_relation_name(s: &str) -> bool {
    RELATION_NAME.is_match(s)
}

/// Check whether `s` is the wire name of one of the closed set of scalar types.
pub fn is_known_scalar_type(s: &str) -> bool {
    s.parse::<ScalarType>().is_ok()
}

/// Check a component filename against the `schema-{order}-{domain}.{ext}`
/// convention.
pub fn is_valid_component_filename(s: &str) -> bool {
    COMPONENT_FILENAME.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_snake_case() {
        assert!(is_valid_identifier("actors_users"));
        assert!(is_valid_identifier("id"));
        assert!(is_valid_identifier("a1_b2"));
    }

    #[test]
    fn test_identifier_rejects_bad_shapes() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("Users"));
        assert!(!is_valid_identifier("_users"));
        assert!(!is_valid_identifier("1users"));
        assert!(!is_valid_identifier("user-name"));
        assert!(!is_valid_identifier("userName"));
        assert!(!is_valid_identifier("naïve"));
    }

    #[test]
    fn test_relation_name_is_looser() {
        assert!(is_valid_relation_name("author"));
        assert!(is_valid_relation_name("customerOrder"));
        assert!(is_valid_relation_name("_parent"));
        assert!(is_valid_relation_name("Parent2"));
        assert!(!is_valid_relation_name(""));
        assert!(!is_valid_relation_name("2parent"));
        assert!(!is_valid_relation_name("parent-id"));
    }

    #[test]
    fn test_known_scalar_types() {
        for name in ["boolean", "int", "double", "string", "uri", "uuid", "datetime"] {
            assert!(is_known_scalar_type(name), "{name} should be known");
        }
        assert!(!is_known_scalar_type("varchar"));
        assert!(!is_known_scalar_type("String"));
        assert!(!is_known_scalar_type(""));
    }

    #[test]
    fn test_component_filename() {
        assert!(is_valid_component_filename("schema-01-actors.prisma"));
        assert!(is_valid_component_filename("schema-12-system-audit.prisma"));
        assert!(is_valid_component_filename("schema-100-x.sql"));
        assert!(!is_valid_component_filename("schema-1-actors.prisma"));
        assert!(!is_valid_component_filename("schema-01-Actors.prisma"));
        assert!(!is_valid_component_filename("schema-01-actors"));
        assert!(!is_valid_component_filename("actors.prisma"));
        assert!(!is_valid_component_filename("schema-01--actors.prisma"));
    }
}

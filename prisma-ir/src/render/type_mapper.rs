//! Scalar type to Prisma column type mappings.
//!
//! # Type Mappings
//!
//! | Scalar     | Prisma type | Native attribute (postgresql) |
//! |------------|-------------|-------------------------------|
//! | `uuid`     | `String`    | `@db.Uuid`                    |
//! | `string`   | `String`    |                               |
//! | `uri`      | `String`    | `@db.VarChar(80000)`          |
//! | `int`      | `Int`       |                               |
//! | `double`   | `Float`     | `@db.DoublePrecision`         |
//! | `boolean`  | `Boolean`   |                               |
//! | `datetime` | `DateTime`  | `@db.Timestamptz`             |

use crate::ir::ScalarType;

use super::options::Provider;

/// Maps [`ScalarType`]s to Prisma column declarations.
#[derive(Debug, Clone, Copy)]
pub struct PrismaTypeMapper {
    provider: Provider,
}

impl PrismaTypeMapper {
    /// Create a mapper for a provider.
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    /// Prisma scalar name.
    pub fn scalar(&self, ty: ScalarType) -> &'static str {
        match ty {
            ScalarType::Boolean => "Boolean",
            ScalarType::Int => "Int",
            ScalarType::Double => "Float",
            ScalarType::String | ScalarType::Uri | ScalarType::Uuid => "String",
            ScalarType::Datetime => "DateTime",
        }
    }

    /// Native type attribute, if the provider has one for this scalar.
    pub fn native_attribute(&self, ty: ScalarType) -> Option<&'static str> {
        if !self.provider.supports_native_types() {
            return None;
        }
        match ty {
            ScalarType::Uuid => Some("@db.Uuid"),
            ScalarType::Uri => Some("@db.VarChar(80000)"),
            ScalarType::Double => Some("@db.DoublePrecision"),
            ScalarType::Datetime => Some("@db.Timestamptz"),
            ScalarType::Boolean | ScalarType::Int | ScalarType::String => None,
        }
    }

    /// Full column type: scalar, optional marker, then attributes.
    ///
    /// `attributes` are placed between the type and the native attribute,
    /// e.g. `String @id @db.Uuid`.
    pub fn column_type(&self, ty: ScalarType, nullable: bool, attributes: &[&str]) -> String {
        let mut parts = vec![format!(
            "{}{}",
            self.scalar(ty),
            if nullable { "?" } else { "" }
        )];
        parts.extend(attributes.iter().map(|a| a.to_string()));
        if let Some(native) = self.native_attribute(ty) {
            parts.push(native.to_string());
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgresql_mappings() {
        let mapper = PrismaTypeMapper::new(Provider::Postgresql);
        assert_eq!(mapper.column_type(ScalarType::Uuid, false, &["@id"]), "String @id @db.Uuid");
        assert_eq!(mapper.column_type(ScalarType::String, false, &[]), "String");
        assert_eq!(
            mapper.column_type(ScalarType::Uri, true, &[]),
            "String? @db.VarChar(80000)"
        );
        assert_eq!(
            mapper.column_type(ScalarType::Double, false, &[]),
            "Float @db.DoublePrecision"
        );
        assert_eq!(
            mapper.column_type(ScalarType::Datetime, true, &[]),
            "DateTime? @db.Timestamptz"
        );
        assert_eq!(mapper.column_type(ScalarType::Int, false, &[]), "Int");
        assert_eq!(mapper.column_type(ScalarType::Boolean, false, &[]), "Boolean");
    }

    #[test]
    fn test_sqlite_drops_native_attributes() {
        let mapper = PrismaTypeMapper::new(Provider::Sqlite);
        for ty in ScalarType::ALL {
            assert!(mapper.native_attribute(ty).is_none());
        }
        assert_eq!(
            mapper.column_type(ScalarType::Uuid, true, &["@unique"]),
            "String? @unique"
        );
    }
}

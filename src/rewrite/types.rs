//! Type tables for the `convert(<type>, …)` cast rewrite.
//!
//! Both tables are keyed by the lowercased SQL Server type name. A type that is
//! missing from [`ALLOWED_TYPES`] is never rewritten; a type that is allowed
//! but missing from [`TYPE_MAPPINGS`] keeps its original spelling.

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;

/// SQL Server type name → PostgreSQL type name
static TYPE_MAPPINGS: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("nvarchar", "varchar"),
        ("nchar", "char"),
        ("double", "double precision"),
        ("datetime", "timestamp"),
        ("datetime2", "timestamp"),
        ("money", "numeric"),
    ]
    .into_iter()
    .collect()
});

/// Types the cast rule is willing to touch
static ALLOWED_TYPES: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        "nvarchar",
        "varchar",
        "nchar",
        "char",
        "decimal",
        "numeric",
        "float",
        "double",
        "real",
        "int",
        "bigint",
        "smallint",
        "tinyint",
        "datetime",
        "datetime2",
        "date",
        "time",
        "money",
    ]
    .into_iter()
    .collect()
});

/// Check whether a type name (any case) may be rewritten.
pub fn is_allowed_type(name: &str) -> bool {
    ALLOWED_TYPES.contains(name.to_lowercase().as_str())
}

/// Target spelling for a source type name.
///
/// Returns the PostgreSQL name when a mapping exists, otherwise `name` as given.
pub fn map_type(name: &str) -> &str {
    match TYPE_MAPPINGS.get(name.to_lowercase().as_str()) {
        Some(mapped) => *mapped,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_are_case_insensitive() {
        assert!(is_allowed_type("nvarchar"));
        assert!(is_allowed_type("NVARCHAR"));
        assert!(is_allowed_type("DateTime2"));
        assert!(!is_allowed_type("xml"));
        assert!(!is_allowed_type("uniqueidentifier"));
        assert!(!is_allowed_type("varbinary"));
    }

    #[test]
    fn test_map_type() {
        assert_eq!(map_type("nvarchar"), "varchar");
        assert_eq!(map_type("NCHAR"), "char");
        assert_eq!(map_type("double"), "double precision");
        assert_eq!(map_type("DATETIME"), "timestamp");
        assert_eq!(map_type("datetime2"), "timestamp");
        assert_eq!(map_type("Money"), "numeric");
    }

    #[test]
    fn test_unmapped_type_keeps_spelling() {
        assert_eq!(map_type("INT"), "INT");
        assert_eq!(map_type("Decimal"), "Decimal");
        assert_eq!(map_type("varchar"), "varchar");
    }

    #[test]
    fn test_every_mapped_type_is_allowed() {
        for source in TYPE_MAPPINGS.keys() {
            assert!(is_allowed_type(source), "{} is mapped but not allowed", source);
        }
    }
}

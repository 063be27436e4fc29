//! Field catalog: the fixed, ordered attribute names of a record
//!
//! The order defines both the on-disk column order and the report column
//! order. Field 0 (Title) is the record key.

/// Number of fields in every record
pub const FIELD_COUNT: usize = 14;

/// Attribute names in storage order
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "Title",
    "Author",
    "Description",
    "Genre",
    "Year",
    "Date",
    "UserRating",
    "Language",
    "Director",
    "Writer",
    "Copyright",
    "Size",
    "MediaType",
    "Duration",
];

/// Index of the key field
pub const KEY_INDEX: usize = 0;

/// Process-wide, immutable field catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCatalog;

impl FieldCatalog {
    pub const fn count(&self) -> usize {
        FIELD_COUNT
    }

    /// Name of field `i`, or `None` when out of range
    pub fn name(&self, i: usize) -> Option<&'static str> {
        FIELD_NAMES.get(i).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        FIELD_NAMES.iter().copied()
    }

    /// Position of a field by exact name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        FIELD_NAMES.iter().position(|n| *n == name)
    }

    /// Position of a field, ignoring ASCII case (for command-line input)
    pub fn index_of_ignore_case(&self, name: &str) -> Option<usize> {
        FIELD_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let catalog = FieldCatalog;
        assert_eq!(catalog.count(), 14);
        assert_eq!(catalog.name(KEY_INDEX), Some("Title"));
        assert_eq!(catalog.name(13), Some("Duration"));
        assert_eq!(catalog.name(14), None);
        assert_eq!(catalog.names().count(), catalog.count());
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = FieldCatalog;
        assert_eq!(catalog.index_of("Director"), Some(8));
        assert_eq!(catalog.index_of("director"), None);
        assert_eq!(catalog.index_of_ignore_case("director"), Some(8));
        assert_eq!(catalog.index_of_ignore_case("Producer"), None);
    }
}

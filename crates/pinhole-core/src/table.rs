/// Logical name of a table in the column-family store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableName(&'static str);

impl TableName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Table holding one row per short domain. Each long domain registered
/// under the short domain is a column in [`DOMAINS_FAMILY`], with the
/// registration timestamp as the cell value.
pub const SHORT_DOMAIN_TABLE: TableName = TableName::new("sdom");

/// Column family of [`SHORT_DOMAIN_TABLE`].
pub const DOMAINS_FAMILY: &str = "domains";

/// Table holding one row per long domain, pointing back at the owning
/// short domain.
pub const LONG_DOMAIN_TABLE: TableName = TableName::new("ldom");

/// Column family of [`LONG_DOMAIN_TABLE`].
pub const DATA_FAMILY: &str = "data";

/// The single qualifier in [`DATA_FAMILY`] whose value is the owning
/// short domain.
pub const SHORT_DOMAIN_QUALIFIER: &[u8] = b"sdom";

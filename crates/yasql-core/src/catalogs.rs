use std::collections::HashSet;
use std::sync::LazyLock;

/// Types which receive the UNSIGNED attribute unless marked with `+`.
pub static NUMERIC_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    let mut s = HashSet::new();
    // Integer types
    s.insert("tinyint");
    s.insert("smallint");
    s.insert("mediumint");
    s.insert("int");
    s.insert("integer");
    s.insert("bigint");
    // Fixed and floating point
    s.insert("real");
    s.insert("double");
    s.insert("float");
    s.insert("decimal");
    s.insert("numeric");
    s
});

/// SQL-native clauses that are kept verbatim at the end of a column definition.
pub const TRAILING_KEYWORDS: &[&str] = &[
    "DEFAULT",
    "COMMENT",
    "COLUMN_FORMAT",
    "STORAGE",
    "REFERENCES",
];

/// How many indexes of a kind a single table may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSlots {
    Single,
    Multiple,
}

/// Index keywords accepted in `composite` entries and as column markers.
pub const INDEX_KEYWORDS: &[(&str, IndexSlots)] = &[
    ("PRIMARY", IndexSlots::Single),
    ("UNIQUE", IndexSlots::Multiple),
];

/// Look up an index keyword (case-insensitive) and return its canonical form.
pub fn index_keyword(word: &str) -> Option<(&'static str, IndexSlots)> {
    INDEX_KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .copied()
}

/// Upper bound on `definitions` substitutions for a single column.
pub const MAX_MACRO_EXPANSIONS: usize = 64;

pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_COLLATE: &str = "utf8_general_ci";
pub const DEFAULT_INDENT: usize = 2;
/// Widest accepted indentation; wider requests fall back to the default.
pub const MAX_INDENT: usize = 64;

/// Generator version, stamped into the SQL header.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

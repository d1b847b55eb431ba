//! SQL dialects: identifier quoting and the identifier patterns derived from it.
//!
//! Only MySQL ships. A new dialect is a new [`Dialect`] implementation plus a
//! [`Source`] variant; the parser and generator only talk to the trait.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Characters allowed in an unquoted identifier.
/// See <https://dev.mysql.com/doc/refman/5.7/en/identifiers.html>.
const UNQUOTED_CLASS: &str = r"[0-9a-zA-Z$_\x{0080}-\x{FFFF}]";

/// Characters allowed in a quoted identifier, before removing the quotes.
const QUOTED_CLASS: &str = r"\x{0001}-\x{007F}\x{0080}-\x{FFFF}";

pub trait Dialect: Send + Sync + fmt::Debug {
    /// Tag used in `database.source`.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quotes.
    fn quotes(&self) -> (char, char);

    fn quote(&self, ident: &str) -> String {
        let (open, close) = self.quotes();
        format!("{open}{ident}{close}")
    }

    /// Regex fragment matching a bare identifier, with one capture group.
    fn unquoted_pattern(&self) -> String {
        format!("({UNQUOTED_CLASS}+)")
    }

    /// Regex fragment matching a quoted identifier, capturing its inner text.
    /// Doubled quote characters are accepted as escapes.
    fn quoted_pattern(&self) -> String {
        let (open, close) = self.quotes();
        let o = regex::escape(&open.to_string());
        let c = regex::escape(&close.to_string());
        format!("{o}((?:[{QUOTED_CLASS}&&[^{o}{c}]]|{o}{o}|{c}{c})+){c}")
    }

    /// Pattern for an inline foreign key: `-> table.column`, each identifier
    /// bare or quoted, followed by a space or the end of the text.
    /// Capture groups come in pairs, one pair per quoting combination.
    fn foreign_key_pattern(&self) -> String {
        let u = self.unquoted_pattern();
        let q = self.quoted_pattern();
        format!(
            r"^-> ({u} *\. *{u}|{q} *\. *{u}|{u} *\. *{q}|{q} *\. *{q})( |$)"
        )
    }

    /// Pattern for one identifier, bare or quoted.
    fn identifier_pattern(&self) -> String {
        format!("{}|{}", self.quoted_pattern(), self.unquoted_pattern())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn quotes(&self) -> (char, char) {
        ('`', '`')
    }
}

/// Registered `database.source` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Source {
    #[default]
    #[serde(rename = "MySQL")]
    MySql,
}

impl Source {
    pub const ALL: &'static [Source] = &[Source::MySql];

    /// Resolve a `database.source` tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.dialect().name() == tag)
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            Source::MySql => &MySql,
        }
    }

    /// Compiled patterns for this dialect, built once per process.
    pub(crate) fn patterns(&self) -> &'static DialectPatterns {
        match self {
            Source::MySql => &MYSQL_PATTERNS,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

#[derive(Debug)]
pub(crate) struct DialectPatterns {
    pub foreign_key: Regex,
    pub identifier: Regex,
}

impl DialectPatterns {
    fn compile(dialect: &dyn Dialect) -> Self {
        Self {
            foreign_key: Regex::new(&dialect.foreign_key_pattern()).unwrap(),
            identifier: Regex::new(&dialect.identifier_pattern()).unwrap(),
        }
    }
}

static MYSQL_PATTERNS: LazyLock<DialectPatterns> =
    LazyLock::new(|| DialectPatterns::compile(&MySql));

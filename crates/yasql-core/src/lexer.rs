//! Column specification scanner.
//!
//! A column spec such as `int+ NULLABLE UNIQUE DEFAULT 0 COMMENT 'a b'` is
//! split into tokens (quoted literals and parenthesized groups stay whole),
//! classified into a [`ColumnSpec`], then rendered back into a SQL clause with
//! the YASQL defaults applied.

use crate::catalogs::{index_keyword, IndexSlots, NUMERIC_TYPES, TRAILING_KEYWORDS};
use crate::types::{ColumnSpec, Nullability};

/// Split a column spec on whitespace, keeping quoted literals
/// (`'...'`, `"..."`, `` `...` ``) and parenthesized groups in one token.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q != '`' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                start.get_or_insert(i);
            }
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }

    if let Some(s) = start {
        tokens.push(&text[s..]);
    }

    tokens
}

fn is_word(token: &str, word: &str) -> bool {
    token.eq_ignore_ascii_case(word)
}

fn is_trailing_keyword(token: &str) -> bool {
    TRAILING_KEYWORDS.iter().any(|k| is_word(token, k))
}

/// A type token is numeric when it contains any numeric type name,
/// case-insensitively: `int4`, `BIGINT(20)` and `middleint` all qualify.
pub fn is_numeric_type(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    NUMERIC_TYPES.iter().any(|t| token.contains(t))
}

/// Classify the tokens of a column spec.
///
/// Index markers (`AUTO_INCREMENT`, `PRIMARY [KEY]`, `UNIQUE [KEY]`),
/// `NULLABLE` and the `UNSIGNED` / `ZEROFILL` attributes are taken from
/// anywhere in the spec. `NULL`, `NOT NULL` and the `+` marker are only looked
/// for before the trailing clause, so `DEFAULT NULL` stays intact.
pub fn scan_column(text: &str) -> ColumnSpec {
    let tokens = tokenize(text);
    let mut spec = ColumnSpec::default();
    let mut body: Vec<String> = Vec::new();
    let mut trailing: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let next = tokens.get(i + 1).copied();
        let next_is = |word: &str| next.is_some_and(|t| is_word(t, word));

        if is_word(token, "AUTO_INCREMENT") {
            spec.auto_increment = true;
        } else if let Some((_, slots)) = index_keyword(token) {
            match slots {
                IndexSlots::Single => spec.primary = true,
                IndexSlots::Multiple => spec.unique = true,
            }
            if next_is("KEY") {
                i += 1;
            }
        } else if is_word(token, "UNSIGNED") {
            // Numeric types are unsigned unless `+` is given.
        } else if is_word(token, "ZEROFILL") {
            spec.zerofill = true;
        } else if is_word(token, "NULLABLE") {
            spec.nullability.get_or_insert(Nullability::Null);
        } else if !trailing.is_empty() || is_trailing_keyword(token) {
            trailing.push(token);
        } else if is_word(token, "NOT") && next_is("NULL") {
            spec.nullability.get_or_insert(Nullability::NotNull);
            i += 1;
        } else if is_word(token, "NULL") {
            spec.nullability.get_or_insert(Nullability::Null);
        } else {
            body.push(token.to_string());
        }
        i += 1;
    }

    spec.numeric = body.first().is_some_and(|t| is_numeric_type(t));

    if spec.numeric {
        if let Some(idx) = body.iter().position(|t| t.contains('+')) {
            let stripped = body[idx].replacen('+', "", 1);
            if stripped.is_empty() {
                body.remove(idx);
            } else {
                body[idx] = stripped;
            }
            spec.signed = true;
        }
    }

    spec.data_type = body.join(" ");
    if !trailing.is_empty() {
        spec.trailing = Some(trailing.join(" "));
    }

    spec
}

impl ColumnSpec {
    /// Render the SQL clause: type, signedness, nullability, trailing clause.
    ///
    /// Numeric types are UNSIGNED unless the `+` marker was used. Columns are
    /// NOT NULL unless NULL or NULLABLE was written.
    pub fn render(&self) -> String {
        let mut clause = self.data_type.clone();

        if self.numeric {
            if !self.signed {
                clause.push_str(" UNSIGNED");
            }
            if self.zerofill {
                clause.push_str(" ZEROFILL");
            }
        }

        clause.push(' ');
        clause.push_str(self.nullability.unwrap_or(Nullability::NotNull).as_sql());

        if let Some(ref trailing) = self.trailing {
            clause.push(' ');
            clause.push_str(trailing);
        }

        clause.trim().to_string()
    }
}

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::catalogs::{
    index_keyword, IndexSlots, DEFAULT_CHARSET, DEFAULT_COLLATE, MAX_MACRO_EXPANSIONS,
};
use crate::dialect::{DialectPatterns, Source};
use crate::error::{ParseError, Result};
use crate::lexer::scan_column;
use crate::types::*;

// --- Parser state ---

struct TableState {
    name: String,
    columns: Vec<Column>,
    indexes: IndexSet,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
    auto_increment: Option<String>,
}

impl TableState {
    fn new(name: String, indexes: IndexSet) -> Self {
        Self {
            name,
            columns: Vec::new(),
            indexes,
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            auto_increment: None,
        }
    }

    /// Install PRIMARY KEY markers collected from the columns, in column order.
    fn finish(mut self) -> Result<Table> {
        if !self.primary_key.is_empty() {
            if self.indexes.primary.is_some() {
                return Err(ParseError::DuplicatePrimaryKey { table: self.name });
            }
            self.indexes.primary = Some(self.primary_key);
        }

        Ok(Table {
            name: self.name,
            columns: self.columns,
            indexes: self.indexes,
            foreign_keys: self.foreign_keys,
            auto_increment: self.auto_increment,
        })
    }
}

/// Parse a YASQL document into a [`SchemaModel`].
pub fn parse(content: &str) -> Result<SchemaModel> {
    let data: Value = serde_yaml::from_str(content)?;
    parse_value(&data)
}

/// Parse an already decoded YASQL document.
pub fn parse_value(data: &Value) -> Result<SchemaModel> {
    let root = data
        .as_mapping()
        .ok_or(ParseError::InvalidFormat { detail: None })?;

    let database = parse_database(root)?;
    let patterns = database.source.patterns();

    let mut indexes = expand_composites(root, patterns)?;
    let definitions = parse_definitions(root)?;

    let mut tables = Vec::new();
    for (key, columns) in section_mapping(root, "tables")? {
        let name = key_to_string(key, "table name")?;
        let state = TableState::new(name.clone(), indexes.remove(&name).unwrap_or_default());
        let table = parse_table(state, columns, &definitions, patterns)?;
        debug!(
            table = %table.name,
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            "parsed table"
        );
        tables.push(table);
    }

    for table in indexes.keys() {
        warn!(table = %table, "composite index declared on unknown table, skipping");
    }

    Ok(SchemaModel { database, tables })
}

// --- Database ---

fn parse_database(root: &Mapping) -> Result<Database> {
    let db = root.get("database").and_then(Value::as_mapping);
    let field = |key: &str| db.and_then(|d| d.get(key)).and_then(scalar_to_string);

    let name = field("name").ok_or(ParseError::MissingDatabaseName)?;

    let source = match field("source") {
        Some(tag) => Source::from_tag(&tag).ok_or(ParseError::UnsupportedSource { dialect: tag })?,
        None => Source::default(),
    };

    let authors = match db.and_then(|d| d.get("authors")) {
        Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    };

    Ok(Database {
        name,
        source,
        charset: field("charset").unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
        collate: field("collate").unwrap_or_else(|| DEFAULT_COLLATE.to_string()),
        metadata: Metadata {
            project: field("project"),
            description: field("description"),
            version: field("version"),
            license: field("license"),
            authors,
        },
    })
}

// --- Composite indexes ---

fn expand_composites(
    root: &Mapping,
    patterns: &DialectPatterns,
) -> Result<HashMap<String, IndexSet>> {
    let mut indexes: HashMap<String, IndexSet> = HashMap::new();

    let entries = match root.get("composite") {
        None | Some(Value::Null) => return Ok(indexes),
        Some(Value::Sequence(seq)) => seq,
        Some(_) => return Err(ParseError::invalid_format("`composite` must be a sequence")),
    };

    for entry in entries {
        let composite = scalar_to_string(entry)
            .ok_or_else(|| ParseError::invalid_format("`composite` entries must be strings"))?;

        let trimmed = composite.trim_start();
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let (keyword, slots) = index_keyword(word).ok_or_else(|| ParseError::UnknownIndexKeyword {
            keyword: word.to_string(),
        })?;

        let rest = rest.trim_start();
        let rest = match rest.split_once(char::is_whitespace) {
            Some((w, tail)) if w.eq_ignore_ascii_case("KEY") => tail,
            _ if rest.eq_ignore_ascii_case("KEY") => "",
            _ => rest,
        };

        let mut identifiers: Vec<String> = patterns
            .identifier
            .captures_iter(rest)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();

        if identifiers.len() < 2 {
            return Err(ParseError::MissingCompositeIdentifiers { composite });
        }

        let table = identifiers.remove(0);
        let set = indexes.entry(table.clone()).or_default();
        match slots {
            IndexSlots::Single => {
                if set.primary.is_some() {
                    return Err(ParseError::DuplicateIndex {
                        table,
                        keyword: keyword.to_string(),
                    });
                }
                set.primary = Some(identifiers);
            }
            IndexSlots::Multiple => set.unique.push(identifiers),
        }
    }

    Ok(indexes)
}

// --- Definitions (macros) ---

fn parse_definitions(root: &Mapping) -> Result<HashMap<String, String>> {
    let mut definitions = HashMap::new();
    for (key, value) in section_mapping(root, "definitions")? {
        let name = key_to_string(key, "definition name")?;
        let expansion = scalar_to_string(value).ok_or_else(|| {
            ParseError::invalid_format(format!("definition `{name}` must be a string"))
        })?;
        definitions.insert(name, expansion.trim().to_string());
    }
    Ok(definitions)
}

/// Replace the first token while it names a definition.
fn expand_definitions(
    text: &str,
    definitions: &HashMap<String, String>,
    table: &str,
    column: &str,
) -> Result<String> {
    let mut text = text.to_string();
    let mut expansions = 0;

    loop {
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest)),
            None => (text.as_str(), None),
        };
        let Some(expansion) = definitions.get(head) else {
            return Ok(text);
        };
        if expansions == MAX_MACRO_EXPANSIONS {
            return Err(ParseError::MacroExpansionOverflow {
                table: table.to_string(),
                column: column.to_string(),
                limit: MAX_MACRO_EXPANSIONS,
            });
        }
        expansions += 1;
        text = match rest {
            Some(rest) => format!("{expansion} {rest}"),
            None => expansion.clone(),
        };
    }
}

// --- Tables and columns ---

fn parse_table(
    mut state: TableState,
    columns: &Value,
    definitions: &HashMap<String, String>,
    patterns: &DialectPatterns,
) -> Result<Table> {
    let columns = match columns {
        Value::Null => return state.finish(),
        Value::Mapping(m) => m,
        _ => {
            return Err(ParseError::invalid_format(format!(
                "table `{}` must be a mapping of columns",
                state.name
            )))
        }
    };

    for (key, raw) in columns {
        let column = key_to_string(key, "column name")?;
        parse_column(&mut state, column, raw, definitions, patterns)?;
    }

    state.finish()
}

fn parse_column(
    state: &mut TableState,
    column: String,
    raw: &Value,
    definitions: &HashMap<String, String>,
    patterns: &DialectPatterns,
) -> Result<()> {
    let table = state.name.as_str();
    let text = match raw {
        Value::Sequence(_) | Value::Mapping(_) => {
            return Err(ParseError::invalid_format(format!(
                "column `{table}`.`{column}` must be a string"
            )))
        }
        other => scalar_to_string(other).unwrap_or_default(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::MissingColumnDefinition {
            table: table.to_string(),
            column,
        });
    }

    let mut text = expand_definitions(text, definitions, table, &column)?;

    if let Some(pos) = text.find("->") {
        let (references, len) = match_foreign_key(&text[pos..], patterns).ok_or_else(|| {
            ParseError::ForeignKeySyntaxError {
                table: table.to_string(),
                column: column.clone(),
            }
        })?;
        text = format!("{}{}", &text[..pos], &text[pos + len..]);
        state.foreign_keys.push(ForeignKey {
            column: column.clone(),
            references,
        });
    }

    let spec = scan_column(&text);

    if spec.auto_increment {
        if state.auto_increment.is_some() {
            return Err(ParseError::DuplicateAutoIncrement {
                table: table.to_string(),
            });
        }
        state.auto_increment = Some(column.clone());
    }
    if spec.primary {
        state.primary_key.push(column.clone());
    }
    if spec.unique {
        state.indexes.unique.push(vec![column.clone()]);
    }

    if spec.data_type.is_empty() {
        return Err(ParseError::EmptyColumn {
            table: table.to_string(),
            column,
        });
    }

    state.columns.push(Column {
        name: column,
        definition: spec.render(),
    });

    Ok(())
}

/// Match `-> table.column` at the start of `text`, returning the reference and
/// the matched length. The first two non-empty captures are the identifiers,
/// whichever quoting combination matched.
fn match_foreign_key(text: &str, patterns: &DialectPatterns) -> Option<(Reference, usize)> {
    let caps = patterns.foreign_key.captures(text)?;
    let len = caps.get(0)?.end();
    let mut idents = caps
        .iter()
        .skip(2)
        .flatten()
        .map(|m| m.as_str())
        .filter(|s| !s.trim().is_empty());
    let table = idents.next()?.to_string();
    let column = idents.next()?.to_string();
    Some((Reference { table, column }, len))
}

// --- Value helpers ---

/// Render a YAML scalar as text. Sequences, mappings and null yield `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
    .filter(|s| !s.trim().is_empty())
}

fn key_to_string(key: &Value, what: &str) -> Result<String> {
    scalar_to_string(key).ok_or_else(|| ParseError::invalid_format(format!("invalid {what}")))
}

/// Entries of an optional top-level mapping section.
fn section_mapping<'a>(
    root: &'a Mapping,
    key: &str,
) -> Result<Box<dyn Iterator<Item = (&'a Value, &'a Value)> + 'a>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(Box::new(std::iter::empty())),
        Some(Value::Mapping(m)) => Ok(Box::new(m.iter())),
        Some(_) => Err(ParseError::invalid_format(format!(
            "`{key}` must be a mapping"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn model(input: &str) -> SchemaModel {
        parse(input).unwrap()
    }

    fn table<'a>(model: &'a SchemaModel, name: &str) -> &'a Table {
        model.table(name).unwrap()
    }

    #[test]
    fn parse_rejects_non_mapping() {
        assert_eq!(
            parse("- a\n- b").unwrap_err(),
            ParseError::InvalidFormat { detail: None }
        );
        assert_eq!(
            parse("just text").unwrap_err(),
            ParseError::InvalidFormat { detail: None }
        );
    }

    #[test]
    fn parse_rejects_invalid_yaml() {
        let err = parse("database: [unclosed").unwrap_err();
        assert_eq!(err.kind(), "Yaml");
    }

    #[test]
    fn parse_requires_database_name() {
        assert_eq!(
            parse("tables: {}").unwrap_err(),
            ParseError::MissingDatabaseName
        );
        assert_eq!(
            parse("database:\n  charset: utf8").unwrap_err(),
            ParseError::MissingDatabaseName
        );
    }

    #[test]
    fn parse_rejects_unknown_source() {
        assert_eq!(
            parse("database:\n  name: db\n  source: PostgreSQL").unwrap_err(),
            ParseError::UnsupportedSource {
                dialect: "PostgreSQL".into()
            }
        );
    }

    #[test]
    fn database_defaults_and_metadata() {
        let m = model(
            "database:\n  name: shop\n  project: Shop\n  version: 1.2\n  authors:\n    - Ann\n    - Bo",
        );
        assert_eq!(m.database.name, "shop");
        assert_eq!(m.database.source, Source::MySql);
        assert_eq!(m.database.charset, "utf8");
        assert_eq!(m.database.collate, "utf8_general_ci");
        assert_eq!(m.database.metadata.project.as_deref(), Some("Shop"));
        assert_eq!(m.database.metadata.version.as_deref(), Some("1.2"));
        assert_eq!(m.database.metadata.authors, vec!["Ann", "Bo"]);
        assert!(m.tables.is_empty());
    }

    #[test]
    fn single_author_string() {
        let m = model("database:\n  name: db\n  authors: Ann <ann@example.com>");
        assert_eq!(m.database.metadata.authors, vec!["Ann <ann@example.com>"]);
    }

    #[test]
    fn columns_keep_declaration_order() {
        let m = model(
            "database:\n  name: db\ntables:\n  t:\n    zeta: int\n    alpha: text\n    mid: date",
        );
        let names: Vec<&str> = table(&m, "t").columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn single_primary_marker() {
        let m = model("database:\n  name: db\ntables:\n  t:\n    id: int PRIMARY");
        assert_eq!(table(&m, "t").indexes.primary, Some(vec!["id".to_string()]));
        assert_eq!(table(&m, "t").columns[0].definition, "int UNSIGNED NOT NULL");
    }

    #[test]
    fn primary_markers_form_composite_in_order() {
        let m = model(
            "database:\n  name: db\ntables:\n  t:\n    b: int PRIMARY\n    x: text\n    a: int PRIMARY KEY",
        );
        assert_eq!(
            table(&m, "t").indexes.primary,
            Some(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn composite_primary_conflicts_with_marker() {
        let err = parse(
            "database:\n  name: db\ncomposite:\n  - PRIMARY t a b\ntables:\n  t:\n    a: int PRIMARY\n    b: int",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::DuplicatePrimaryKey { table: "t".into() });
    }

    #[test]
    fn duplicate_composite_primary() {
        let err = parse(
            "database:\n  name: db\ncomposite:\n  - PRIMARY t a b\n  - primary key t c d",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateIndex {
                table: "t".into(),
                keyword: "PRIMARY".into()
            }
        );
    }

    #[test]
    fn composite_keywords_and_identifiers() {
        let m = model(
            "database:\n  name: db\ncomposite:\n  - unique KEY t `first name` last\n  - UNIQUE t a b\n  - Primary t a b\ntables:\n  t:\n    a: int\n    b: int\n    first name: text\n    last: text\n    email: text UNIQUE",
        );
        let idx = &table(&m, "t").indexes;
        assert_eq!(idx.primary, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            idx.unique,
            vec![
                vec!["first name".to_string(), "last".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["email".to_string()],
            ]
        );
    }

    #[test]
    fn composite_unknown_keyword() {
        let err = parse("database:\n  name: db\ncomposite:\n  - INDEX t a b").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownIndexKeyword {
                keyword: "INDEX".into()
            }
        );
    }

    #[test]
    fn composite_missing_identifiers() {
        let err = parse("database:\n  name: db\ncomposite:\n  - UNIQUE KEY t").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingCompositeIdentifiers {
                composite: "UNIQUE KEY t".into()
            }
        );
    }

    #[test]
    fn composite_on_unknown_table_is_dropped() {
        let m = model(
            "database:\n  name: db\ncomposite:\n  - UNIQUE ghost a b\ntables:\n  t:\n    a: int",
        );
        assert!(table(&m, "t").indexes.is_empty());
    }

    #[test]
    fn definitions_expand_transitively() {
        let m = model(
            "database:\n  name: db\ndefinitions:\n  id: serial PRIMARY\n  serial: int AUTO_INCREMENT\n  money: decimal(10,2)+\ntables:\n  t:\n    id: id\n    price: money NULLABLE",
        );
        let t = table(&m, "t");
        assert_eq!(t.auto_increment.as_deref(), Some("id"));
        assert_eq!(t.indexes.primary, Some(vec!["id".to_string()]));
        assert_eq!(t.columns[0].definition, "int UNSIGNED NOT NULL");
        assert_eq!(t.columns[1].definition, "decimal(10,2) NULL");
    }

    #[test]
    fn cyclic_definitions_overflow() {
        let err = parse(
            "database:\n  name: db\ndefinitions:\n  a: b x\n  b: a y\ntables:\n  t:\n    c: a",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::MacroExpansionOverflow {
                table: "t".into(),
                column: "c".into(),
                limit: MAX_MACRO_EXPANSIONS
            }
        );
    }

    #[test]
    fn foreign_key_quoted_and_stripped() {
        let m = model(
            "database:\n  name: db\ntables:\n  items:\n    order_id: int -> `orders`.`id`\n    user_id: int -> users.`id` NULLABLE\n    sku: varchar(20) -> `products`.code",
        );
        let t = table(&m, "items");
        assert_eq!(
            t.foreign_keys,
            vec![
                ForeignKey {
                    column: "order_id".into(),
                    references: Reference {
                        table: "orders".into(),
                        column: "id".into()
                    }
                },
                ForeignKey {
                    column: "user_id".into(),
                    references: Reference {
                        table: "users".into(),
                        column: "id".into()
                    }
                },
                ForeignKey {
                    column: "sku".into(),
                    references: Reference {
                        table: "products".into(),
                        column: "code".into()
                    }
                },
            ]
        );
        assert_eq!(t.columns[0].definition, "int UNSIGNED NOT NULL");
        assert_eq!(t.columns[1].definition, "int UNSIGNED NULL");
        assert_eq!(t.columns[2].definition, "varchar(20) NOT NULL");
    }

    #[test]
    fn foreign_key_syntax_error() {
        let err = parse("database:\n  name: db\ntables:\n  t:\n    c: int -> nowhere").unwrap_err();
        assert_eq!(
            err,
            ParseError::ForeignKeySyntaxError {
                table: "t".into(),
                column: "c".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "Syntax error in Foreign Key on column `t`.`c`"
        );
    }

    #[test]
    fn duplicate_auto_increment() {
        let err = parse(
            "database:\n  name: db\ntables:\n  t:\n    a: int AUTO_INCREMENT\n    b: int auto_increment",
        )
        .unwrap_err();
        assert_eq!(err, ParseError::DuplicateAutoIncrement { table: "t".into() });
    }

    #[test]
    fn missing_and_empty_columns() {
        let err = parse("database:\n  name: db\ntables:\n  t:\n    a: ''").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingColumnDefinition {
                table: "t".into(),
                column: "a".into()
            }
        );
        let err = parse("database:\n  name: db\ntables:\n  t:\n    a:").unwrap_err();
        assert_eq!(err.kind(), "MissingColumnDefinition");

        let err = parse("database:\n  name: db\ntables:\n  t:\n    a: PRIMARY").unwrap_err();
        assert_eq!(
            err,
            ParseError::EmptyColumn {
                table: "t".into(),
                column: "a".into()
            }
        );
    }

    #[test]
    fn malformed_sections() {
        let err = parse("database:\n  name: db\ntables:\n  - a").unwrap_err();
        assert_eq!(err.kind(), "InvalidFormat");
        let err = parse("database:\n  name: db\ntables:\n  t:\n    a: [int]").unwrap_err();
        assert_eq!(err.kind(), "InvalidFormat");
        let err = parse("database:\n  name: db\ncomposite: UNIQUE t a").unwrap_err();
        assert_eq!(err.kind(), "InvalidFormat");
    }
}

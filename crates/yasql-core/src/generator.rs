//! SQL generation from a parsed [`SchemaModel`].
//!
//! Output layout: header comment, database statements, then the `Tables`,
//! `Indexes`, `AUTO_INCREMENT` and `Foreigns` sections. Empty sections are
//! omitted; every statement is followed by a blank line.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use tracing::debug;

use crate::catalogs::{DEFAULT_INDENT, GENERATOR_VERSION, MAX_INDENT};
use crate::dialect::Dialect;
use crate::types::*;

/// Indentation width from untrusted input. Missing, negative or wider than
/// [`MAX_INDENT`] falls back to 2.
pub fn resolve_indent(width: Option<i64>) -> usize {
    width
        .and_then(|w| usize::try_from(w).ok())
        .filter(|w| *w <= MAX_INDENT)
        .unwrap_or(DEFAULT_INDENT)
}

/// Render a model with the given indentation and the current local time.
pub fn generate(model: &SchemaModel, indent: Option<i64>) -> String {
    Generator::new(model).indent(indent).render()
}

pub struct Generator<'a> {
    model: &'a SchemaModel,
    indent: usize,
    timestamp: Option<DateTime<FixedOffset>>,
}

impl<'a> Generator<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self {
            model,
            indent: DEFAULT_INDENT,
            timestamp: None,
        }
    }

    pub fn indent(mut self, width: Option<i64>) -> Self {
        self.indent = resolve_indent(width);
        self
    }

    /// Fix the header timestamp instead of reading the clock.
    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn render(&self) -> String {
        let dialect = self.model.database.source.dialect();
        let db = &self.model.database;
        let pad = " ".repeat(self.indent);

        let mut lines = self.header();
        lines.push(String::new());

        lines.push(format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            dialect.quote(&db.name)
        ));
        lines.push(format!("{pad}CHARACTER SET {}", db.charset));
        lines.push(format!("{pad}COLLATE {};", db.collate));
        lines.push(String::new());
        lines.push(format!("USE {};", dialect.quote(&db.name)));
        lines.push(String::new());

        lines.extend(section("Tables", self.tables(dialect, &pad)));
        lines.extend(section("Indexes", self.indexes(dialect, &pad)));
        lines.extend(section("AUTO_INCREMENT", self.auto_increments(dialect, &pad)));
        lines.extend(section("Foreigns", self.foreigns(dialect, &pad)));

        let mut sql = lines.join("\n");
        // Every block ends with an empty line, so the join leaves exactly one
        // trailing newline.
        if !sql.ends_with('\n') {
            sql.push('\n');
        }
        sql
    }

    fn header(&self) -> Vec<String> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| Local::now().into())
            .to_rfc3339_opts(SecondsFormat::Secs, false);

        let mut lines = vec![
            "-- Generated with yasql".to_string(),
            "--".to_string(),
            format!("-- Timestamp: {timestamp}"),
            format!("-- yasql version: {GENERATOR_VERSION}"),
        ];

        // Multi-line values must stay inside the comment.
        let comment = |v: &str| v.lines().collect::<Vec<_>>().join("\n-- ");

        let meta = &self.model.database.metadata;
        let entries = [
            ("Project", meta.project.as_deref().map(comment)),
            ("Description", meta.description.as_deref().map(comment)),
            ("Version", meta.version.as_deref().map(comment)),
            ("License", meta.license.as_deref().map(comment)),
            (
                "Authors",
                (!meta.authors.is_empty()).then(|| {
                    meta.authors
                        .iter()
                        .map(|a| comment(a))
                        .collect::<Vec<_>>()
                        .join("\n--          ")
                }),
            ),
        ];

        let present: Vec<String> = entries
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| format!("-- {label}: {v}")))
            .collect();

        if !present.is_empty() {
            lines.push("--".to_string());
            lines.extend(present);
        }

        lines
    }

    fn tables(&self, dialect: &dyn Dialect, pad: &str) -> Vec<String> {
        let mut lines = Vec::new();

        for table in &self.model.tables {
            lines.push(format!("CREATE TABLE {} (", dialect.quote(&table.name)));
            let columns = table
                .columns
                .iter()
                .map(|c| format!("{pad}{} {}", dialect.quote(&c.name), c.definition))
                .collect();
            lines.extend(append_last(columns, "", ","));
            lines.push(format!(
                ") CHARACTER SET {};",
                self.model.database.charset
            ));
            lines.push(String::new());
        }

        debug!(tables = self.model.tables.len(), "rendered tables");
        lines
    }

    fn indexes(&self, dialect: &dyn Dialect, pad: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let column_list = |columns: &[String]| {
            columns
                .iter()
                .map(|c| dialect.quote(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        for table in &self.model.tables {
            let idx = &table.indexes;
            if idx.is_empty() {
                continue;
            }

            let mut adds = Vec::new();
            if let Some(ref primary) = idx.primary {
                adds.push(format!("{pad}ADD PRIMARY KEY ({})", column_list(primary)));
            }
            for unique in &idx.unique {
                adds.push(format!("{pad}ADD UNIQUE KEY ({})", column_list(unique)));
            }

            lines.push(format!("ALTER TABLE {}", dialect.quote(&table.name)));
            lines.extend(append_last(adds, ";", ","));
            lines.push(String::new());
        }

        lines
    }

    fn auto_increments(&self, dialect: &dyn Dialect, pad: &str) -> Vec<String> {
        let mut lines = Vec::new();

        for table in &self.model.tables {
            let Some(column) = table
                .auto_increment
                .as_deref()
                .and_then(|name| table.column(name))
            else {
                continue;
            };

            lines.push(format!("ALTER TABLE {}", dialect.quote(&table.name)));
            lines.push(format!(
                "{pad}MODIFY {} {} AUTO_INCREMENT;",
                dialect.quote(&column.name),
                column.definition
            ));
            lines.push(String::new());
        }

        lines
    }

    fn foreigns(&self, dialect: &dyn Dialect, pad: &str) -> Vec<String> {
        let mut lines = Vec::new();

        for table in &self.model.tables {
            if table.foreign_keys.is_empty() {
                continue;
            }

            let adds = table
                .foreign_keys
                .iter()
                .map(|fk| {
                    format!(
                        "{pad}ADD FOREIGN KEY ({}) REFERENCES {} ({})",
                        dialect.quote(&fk.column),
                        dialect.quote(&fk.references.table),
                        dialect.quote(&fk.references.column)
                    )
                })
                .collect();

            lines.push(format!("ALTER TABLE {}", dialect.quote(&table.name)));
            lines.extend(append_last(adds, ";", ","));
            lines.push(String::new());
        }

        lines
    }
}

/// Prefix a non-empty section with its comment banner.
fn section(title: &str, body: Vec<String>) -> Vec<String> {
    if body.is_empty() {
        return body;
    }
    let mut lines = vec![
        "--".to_string(),
        format!("-- {title}"),
        "--".to_string(),
        String::new(),
    ];
    lines.extend(body);
    lines
}

/// Append `last` to the final item and `others` to every other item.
fn append_last(items: Vec<String>, last: &str, others: &str) -> Vec<String> {
    let count = items.len();
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if i + 1 == count {
                item + last
            } else {
                item + others
            }
        })
        .collect()
}

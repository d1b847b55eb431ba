//! Parse errors.
//!
//! Every condition is fatal: the parser stops at the first one and no partial
//! model is produced.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("YASQL is not valid YAML: {message}")]
    Yaml { message: String },

    #[error("YASQL must be a mapping{}", detail_suffix(.detail))]
    InvalidFormat { detail: Option<String> },

    #[error("Database needs a name")]
    MissingDatabaseName,

    #[error("Unsupported source '{dialect}'")]
    UnsupportedSource { dialect: String },

    #[error("Unknown index '{keyword}'")]
    UnknownIndexKeyword { keyword: String },

    #[error("Missing identifiers in composite '{composite}'")]
    MissingCompositeIdentifiers { composite: String },

    #[error("Duplicated composite for single column key {keyword} on table `{table}`")]
    DuplicateIndex { table: String, keyword: String },

    #[error("Missing column definition in `{table}`.`{column}`")]
    MissingColumnDefinition { table: String, column: String },

    #[error("Definitions expanded more than {limit} times in `{table}`.`{column}`")]
    MacroExpansionOverflow {
        table: String,
        column: String,
        limit: usize,
    },

    #[error("Syntax error in Foreign Key on column `{table}`.`{column}`")]
    ForeignKeySyntaxError { table: String, column: String },

    #[error("Multiple AUTO_INCREMENT on table `{table}`")]
    DuplicateAutoIncrement { table: String },

    #[error("Column `{table}`.`{column}` is empty")]
    EmptyColumn { table: String, column: String },

    #[error("Multiple PRIMARY KEY on table `{table}`")]
    DuplicatePrimaryKey { table: String },
}

impl ParseError {
    pub(crate) fn invalid_format(detail: impl Into<String>) -> Self {
        ParseError::InvalidFormat {
            detail: Some(detail.into()),
        }
    }

    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::Yaml { .. } => "Yaml",
            ParseError::InvalidFormat { .. } => "InvalidFormat",
            ParseError::MissingDatabaseName => "MissingDatabaseName",
            ParseError::UnsupportedSource { .. } => "UnsupportedSource",
            ParseError::UnknownIndexKeyword { .. } => "UnknownIndexKeyword",
            ParseError::MissingCompositeIdentifiers { .. } => "MissingCompositeIdentifiers",
            ParseError::DuplicateIndex { .. } => "DuplicateIndex",
            ParseError::MissingColumnDefinition { .. } => "MissingColumnDefinition",
            ParseError::MacroExpansionOverflow { .. } => "MacroExpansionOverflow",
            ParseError::ForeignKeySyntaxError { .. } => "ForeignKeySyntaxError",
            ParseError::DuplicateAutoIncrement { .. } => "DuplicateAutoIncrement",
            ParseError::EmptyColumn { .. } => "EmptyColumn",
            ParseError::DuplicatePrimaryKey { .. } => "DuplicatePrimaryKey",
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(e: serde_yaml::Error) -> Self {
        ParseError::Yaml {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_table_and_column() {
        let err = ParseError::EmptyColumn {
            table: "users".into(),
            column: "id".into(),
        };
        assert_eq!(err.to_string(), "Column `users`.`id` is empty");
        assert_eq!(err.kind(), "EmptyColumn");
    }

    #[test]
    fn invalid_format_detail() {
        assert_eq!(
            ParseError::InvalidFormat { detail: None }.to_string(),
            "YASQL must be a mapping"
        );
        assert_eq!(
            ParseError::invalid_format("`tables` is a sequence").to_string(),
            "YASQL must be a mapping: `tables` is a sequence"
        );
    }
}

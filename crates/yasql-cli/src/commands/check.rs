use std::path::Path;

use tracing::debug;

use crate::reader::read_yasql_files;

/// Parse every YASQL file under `input_path`. Returns the report and the
/// number of files that failed.
pub fn run_check(input_path: &Path) -> Result<(String, usize), String> {
    let files = read_yasql_files(input_path)?;

    if files.is_empty() {
        return Err(format!(
            "No YASQL files (.yml, .yaml, .yasql) found at: {}",
            input_path.display()
        ));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut error_count = 0;

    for file in &files {
        match yasql_core::parse(&file.content) {
            Ok(model) => {
                debug!(file = %file.path, tables = model.tables.len(), "ok");
                lines.push(format!("{}: ok", file.path));
            }
            Err(e) => {
                error_count += 1;
                lines.push(format!("{}: error: {e}", file.path));
            }
        }
    }

    let file_count = files.len();
    let error_word = if error_count == 1 { "error" } else { "errors" };
    let file_word = if file_count == 1 { "file" } else { "files" };
    lines.push(format!(
        "{error_count} {error_word} in {file_count} {file_word}."
    ));

    Ok((lines.join("\n"), error_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reports_each_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.yml"), "database:\n  name: b").unwrap();
        fs::write(tmp.path().join("a.yasql"), "database:\n  name: a\ntables:\n  t:\n    c: PRIMARY").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let (report, errors) = run_check(tmp.path()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(errors, 1);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("a.yasql: error: Column `t`.`c` is empty"));
        assert!(lines[1].ends_with("b.yml: ok"));
        assert_eq!(lines[2], "1 error in 2 files.");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_check(tmp.path()).unwrap_err();
        assert!(err.starts_with("No YASQL files"));
    }
}

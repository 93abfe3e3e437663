use crate::question::FlatRow;
use crate::sql::{create_table_sql, insert_sql};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Assemble one output script.
///
/// Layout: optional table definition and a blank line, a comment naming the
/// source batch, the inserts, then a trailing newline.
pub fn compose_script(
    table: &str,
    file_name: &str,
    batch_id: u32,
    rows: &[FlatRow],
    with_schema: bool,
) -> String {
    let mut parts = Vec::new();
    if with_schema {
        parts.push(create_table_sql(table));
        parts.push(String::new());
    }
    parts.push(format!("-- Data from {} (batch_id = {})", file_name, batch_id));
    parts.push(insert_sql(table, rows));
    parts.push(String::new());
    parts.join("\n")
}

pub fn output_file_name(suffix: &str) -> String {
    format!("schema_{}.sql", suffix)
}

/// Write `schema_<suffix>.sql` into `output_dir`, replacing any previous copy.
pub fn write_script(output_dir: &Path, suffix: &str, content: &str) -> Result<PathBuf> {
    let out_path = output_dir.join(output_file_name(suffix));
    fs::write(&out_path, content)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::flatten_question;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_compose_without_schema() {
        let rows = vec![flatten_question(&json!({"id": "q1"}), 4)];
        let script = compose_script("questions", "batch_04.json", 4, &rows, false);

        let lines: Vec<&str> = script.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "-- Data from batch_04.json (batch_id = 4)");
        assert!(lines[1].starts_with("INSERT INTO questions "));
        assert_eq!(lines[2], "");
        assert!(!script.contains("CREATE TABLE"));
    }

    #[test]
    fn test_compose_with_schema() {
        let rows = vec![flatten_question(&json!({"id": "q1"}), 0)];
        let script = compose_script("questions", "batch_00.json", 0, &rows, true);

        assert!(script.starts_with("DROP TABLE IF EXISTS questions;\n\nCREATE TABLE questions (\n"));
        assert!(script.contains(");\n\n-- Data from batch_00.json (batch_id = 0)\nINSERT INTO"));
        assert!(script.ends_with(");\n"));
    }

    #[test]
    fn test_compose_empty_batch() {
        let script = compose_script("questions", "batch_09.json", 9, &[], false);
        assert_eq!(script, "-- Data from batch_09.json (batch_id = 9)\n\n");
    }

    #[test]
    fn test_write_script_keeps_padding() {
        let dir = tempdir().unwrap();
        let path = write_script(dir.path(), "007", "-- hi\n").unwrap();
        assert_eq!(path.file_name().unwrap(), "schema_007.sql");
        assert_eq!(fs::read_to_string(path).unwrap(), "-- hi\n");
    }
}

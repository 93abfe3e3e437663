use crate::question::FlatRow;

pub const DEFAULT_TABLE: &str = "questions";

/// Output table layout, in declaration order.
pub const COLUMNS: &[(&str, &str)] = &[
    ("batch_id", "INTEGER NOT NULL"),
    ("id", "TEXT"),
    ("curriculum_area", "TEXT"),
    ("lecturer", "TEXT"),
    ("topic", "TEXT"),
    ("clusters", "TEXT"), // JSON array
    ("cognitive_level", "TEXT"),
    ("question_type", "TEXT"),
    ("distractor_strategy", "TEXT"),
    ("difficulty", "TEXT"),
    ("source_file", "TEXT"),
    ("source_file_page_number", "INTEGER"),
    ("topics", "TEXT"), // JSON array
    ("question_prompt", "TEXT"),
    ("choices", "TEXT"), // JSON array
    ("explanation", "TEXT"), // JSON object
    ("related_questions", "TEXT"), // JSON array
];

pub const COLUMN_COUNT: usize = 17;

/// A single cell ready to be rendered as a SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    /// Rendered exactly as the source JSON number, digits and all.
    Number(serde_json::Number),
    Text(String),
}

impl SqlValue {
    pub fn text(s: impl Into<String>) -> Self {
        SqlValue::Text(s.into())
    }

    #[cfg(test)]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<u32> for SqlValue {
    fn from(n: u32) -> Self {
        SqlValue::Number(n.into())
    }
}

/// Render a value as a SQL literal token.
pub fn sql_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "1".to_string(),
        SqlValue::Bool(false) => "0".to_string(),
        SqlValue::Number(n) => n.to_string(),
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

pub fn column_names() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|(name, _)| *name)
}

/// `DROP TABLE IF EXISTS` followed by the `CREATE TABLE` for [`COLUMNS`].
pub fn create_table_sql(table: &str) -> String {
    let col_lines: Vec<String> = COLUMNS
        .iter()
        .map(|(name, typedef)| format!("  {} {}", name, typedef))
        .collect();

    let lines = [
        format!("DROP TABLE IF EXISTS {};", table),
        String::new(),
        format!("CREATE TABLE {} (", table),
        col_lines.join(",\n"),
        ");".to_string(),
    ];
    lines.join("\n")
}

/// One `INSERT` per row, newline separated. Empty input gives an empty string.
pub fn insert_sql(table: &str, rows: &[FlatRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let columns = column_names().collect::<Vec<_>>().join(", ");
    rows.iter()
        .map(|row| {
            let values = row
                .values()
                .into_iter()
                .map(sql_literal)
                .collect::<Vec<_>>()
                .join(", ");
            format!("INSERT INTO {} ({}) VALUES ({});", table, columns, values)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_count_matches_table() {
        assert_eq!(COLUMNS.len(), COLUMN_COUNT);
        assert_eq!(COLUMNS[0], ("batch_id", "INTEGER NOT NULL"));
        assert_eq!(COLUMNS[11], ("source_file_page_number", "INTEGER"));
        assert_eq!(COLUMNS[16].0, "related_questions");
    }

    #[test]
    fn test_literal_null_and_bool() {
        assert_eq!(sql_literal(&SqlValue::Null), "NULL");
        assert_eq!(sql_literal(&SqlValue::Bool(true)), "1");
        assert_eq!(sql_literal(&SqlValue::Bool(false)), "0");
    }

    #[test]
    fn test_literal_numbers_unquoted() {
        assert_eq!(sql_literal(&SqlValue::from(7u32)), "7");
        let n = serde_json::Number::from(-12i64);
        assert_eq!(sql_literal(&SqlValue::Number(n)), "-12");
        let f = serde_json::Number::from_f64(2.5).unwrap();
        assert_eq!(sql_literal(&SqlValue::Number(f)), "2.5");
    }

    #[test]
    fn test_literal_doubles_single_quotes() {
        let rendered = sql_literal(&SqlValue::text("it's a 'test'"));
        assert_eq!(rendered, "'it''s a ''test'''");

        // Inside the outer quotes every quote must come in pairs.
        let inner = &rendered[1..rendered.len() - 1];
        assert!(inner.replace("''", "").find('\'').is_none());
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("questions");
        assert!(sql.starts_with("DROP TABLE IF EXISTS questions;\n\nCREATE TABLE questions (\n"));
        assert!(sql.contains("  batch_id INTEGER NOT NULL,\n  id TEXT,\n"));
        assert!(sql.ends_with("  related_questions TEXT\n);"));
        assert_eq!(sql.matches(",\n").count(), COLUMN_COUNT - 1);
    }

    #[test]
    fn test_create_table_custom_name() {
        let sql = create_table_sql("bank");
        assert!(sql.starts_with("DROP TABLE IF EXISTS bank;"));
        assert!(sql.contains("CREATE TABLE bank ("));
    }

    #[test]
    fn test_insert_sql_empty() {
        assert_eq!(insert_sql("questions", &[]), "");
    }

    #[test]
    fn test_insert_sql_one_statement_per_row() {
        let rows = vec![FlatRow::empty(3), FlatRow::empty(3)];
        let sql = insert_sql("questions", &rows);
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("INSERT INTO questions (batch_id, id, curriculum_area,"));
        assert!(lines[0].ends_with("VALUES (3, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL);"));
    }
}

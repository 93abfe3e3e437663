use crate::error::ConvertError;
use crate::sql::{COLUMN_COUNT, SqlValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// One element of a batch array, as loosely as the source files write it.
///
/// Every field is optional and may hold any JSON type; `null` and absence are
/// the same thing.
#[derive(Debug, Default, Deserialize)]
pub struct Question {
    pub id: Option<Value>,
    pub curriculum_area: Option<Value>,
    pub lecturer: Option<Value>,
    pub topic: Option<Value>,
    pub clusters: Option<Value>,
    pub cognitive_level: Option<Value>,
    pub question_type: Option<Value>,
    pub distractor_strategy: Option<Value>,
    pub question_prompt: Option<Value>,
    pub choices: Option<Value>,
    pub explanation: Option<Value>,
    pub related_questions: Option<Value>,
    pub metadata: Option<Value>,
}

/// The nested `metadata` object. Some batches keep `cognitive_level` and
/// `question_type` here instead of at the top level.
#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    pub difficulty: Option<Value>,
    pub source_file: Option<Value>,
    pub source_file_page_number: Option<Value>,
    pub topics: Option<Value>,
    pub cognitive_level: Option<Value>,
    pub question_type: Option<Value>,
}

impl Question {
    /// Read an element. Anything that is not an object reads as empty.
    pub fn from_element(element: &Value) -> Self {
        if !element.is_object() {
            return Self::default();
        }
        Self::deserialize(element).unwrap_or_default()
    }

    pub fn metadata(&self) -> Metadata {
        match &self.metadata {
            Some(meta @ Value::Object(_)) => Metadata::deserialize(meta).unwrap_or_default(),
            _ => Metadata::default(),
        }
    }
}

/// Fixed-shape row, one field per output column in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub batch_id: SqlValue,
    pub id: SqlValue,
    pub curriculum_area: SqlValue,
    pub lecturer: SqlValue,
    pub topic: SqlValue,
    pub clusters: SqlValue,
    pub cognitive_level: SqlValue,
    pub question_type: SqlValue,
    pub distractor_strategy: SqlValue,
    pub difficulty: SqlValue,
    pub source_file: SqlValue,
    pub source_file_page_number: SqlValue,
    pub topics: SqlValue,
    pub question_prompt: SqlValue,
    pub choices: SqlValue,
    pub explanation: SqlValue,
    pub related_questions: SqlValue,
}

impl FlatRow {
    /// A row with only the batch id set.
    pub fn empty(batch_id: u32) -> Self {
        Self {
            batch_id: SqlValue::from(batch_id),
            id: SqlValue::Null,
            curriculum_area: SqlValue::Null,
            lecturer: SqlValue::Null,
            topic: SqlValue::Null,
            clusters: SqlValue::Null,
            cognitive_level: SqlValue::Null,
            question_type: SqlValue::Null,
            distractor_strategy: SqlValue::Null,
            difficulty: SqlValue::Null,
            source_file: SqlValue::Null,
            source_file_page_number: SqlValue::Null,
            topics: SqlValue::Null,
            question_prompt: SqlValue::Null,
            choices: SqlValue::Null,
            explanation: SqlValue::Null,
            related_questions: SqlValue::Null,
        }
    }

    /// Cell values in the order of [`crate::sql::COLUMNS`].
    pub fn values(&self) -> [&SqlValue; COLUMN_COUNT] {
        [
            &self.batch_id,
            &self.id,
            &self.curriculum_area,
            &self.lecturer,
            &self.topic,
            &self.clusters,
            &self.cognitive_level,
            &self.question_type,
            &self.distractor_strategy,
            &self.difficulty,
            &self.source_file,
            &self.source_file_page_number,
            &self.topics,
            &self.question_prompt,
            &self.choices,
            &self.explanation,
            &self.related_questions,
        ]
    }
}

/// Flatten a whole batch. The top-level value must be an array.
pub fn flatten_batch(file: &str, content: &Value, batch_id: u32) -> Result<Vec<FlatRow>, ConvertError> {
    let Some(elements) = content.as_array() else {
        return Err(ConvertError::NotAnArray { file: file.to_string() });
    };

    let rows = elements
        .iter()
        .enumerate()
        .map(|(i, element)| {
            if !element.is_object() {
                tracing::warn!(file, index = i, "element is not an object, inserting empty row");
            }
            flatten_question(element, batch_id)
        })
        .collect();
    Ok(rows)
}

pub fn flatten_question(element: &Value, batch_id: u32) -> FlatRow {
    if !element.is_object() {
        return FlatRow::empty(batch_id);
    }
    let q = Question::from_element(element);
    let meta = q.metadata();

    FlatRow {
        batch_id: SqlValue::from(batch_id),
        id: scalar(q.id),
        curriculum_area: scalar(q.curriculum_area),
        lecturer: scalar(q.lecturer),
        topic: scalar(q.topic),
        clusters: json_text_value(q.clusters),
        cognitive_level: scalar(prefer_top_level(q.cognitive_level, meta.cognitive_level)),
        question_type: scalar(prefer_top_level(q.question_type, meta.question_type)),
        distractor_strategy: scalar(q.distractor_strategy),
        difficulty: scalar(meta.difficulty),
        source_file: scalar(meta.source_file),
        source_file_page_number: scalar(meta.source_file_page_number),
        topics: json_text_value(meta.topics),
        question_prompt: scalar(q.question_prompt),
        choices: json_text_value(q.choices),
        explanation: json_text_value(q.explanation),
        related_questions: json_text_value(q.related_questions),
    }
}

/// Top-level value when truthy, otherwise whatever metadata holds.
pub fn prefer_top_level(top: Option<Value>, nested: Option<Value>) -> Option<Value> {
    match top {
        Some(v) if is_truthy(&v) => Some(v),
        _ => nested,
    }
}

/// JSON-falsy: null, false, 0, "", [] and {}.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Passthrough column. Nested structures still land as JSON text.
fn scalar(value: Option<Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(b)) => SqlValue::Bool(b),
        Some(Value::Number(n)) => SqlValue::Number(n),
        Some(Value::String(s)) => SqlValue::text(s),
        Some(other) => SqlValue::text(to_json_text(&other)),
    }
}

fn json_text_value(value: Option<Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(v) => SqlValue::text(to_json_text(&v)),
    }
}

/// `", "` between items and `": "` after keys, no other whitespace.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Canonical text for a structured field. Key order is kept as in the source
/// and non-ASCII text is written as-is.
pub fn to_json_text(value: &Value) -> String {
    let mut buf = Vec::new();
    let result = {
        let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
        value.serialize(&mut ser)
    };
    match result {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        // Writing a Value into a Vec does not fail; compact text as a fallback.
        Err(_) => value.to_string(),
    }
}

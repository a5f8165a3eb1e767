use crate::document::Document;
use crate::error::RecordError;
use serde_json::{Map, Value};

/// Parse one JSON-lines record into a [`Document`].
///
/// `text` may be a list of strings, a list of lists of strings, a bare string,
/// or absent. Nested lists are flattened one level, non-string elements are
/// dropped and the remaining sentences are joined with a single space.
pub fn parse_record(line: &[u8]) -> std::result::Result<Document, RecordError> {
    let value: Value = serde_json::from_slice(line)?;
    let Value::Object(record) = value else {
        return Err(RecordError::NotAnObject);
    };

    let title = match record.get("title") {
        Some(Value::String(title)) if !title.is_empty() => title.clone(),
        _ => return Err(RecordError::MissingTitle),
    };
    let id = record_id(&record)?.unwrap_or_else(|| title.clone());
    let text = flatten_text(record.get("text"));

    Ok(Document { id, title, text })
}

fn record_id(record: &Map<String, Value>) -> std::result::Result<Option<String>, RecordError> {
    match record.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(_) => Err(RecordError::InvalidId),
    }
}

fn flatten_text(text: Option<&Value>) -> String {
    let mut sentences: Vec<&str> = Vec::new();
    match text {
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(sentence) => sentences.push(sentence),
                    Value::Array(inner) => {
                        sentences.extend(inner.iter().filter_map(Value::as_str));
                    }
                    _ => {}
                }
            }
        }
        Some(Value::String(sentence)) => sentences.push(sentence),
        _ => {}
    }
    sentences.join(" ")
}

//! Readers for the raw message and category files.
//!
//! Records are decoded field by field from byte records so that a message
//! cell holding something other than UTF-8 text surfaces as
//! [`TocsinError::InputType`] rather than a generic CSV failure.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TocsinError};

/// One raw message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub message: String,
    /// Untranslated text, when the message was translated.
    pub original: Option<String>,
    pub genre: String,
}

/// One raw category row: a message id and its label blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: i64,
    pub categories: String,
}

/// Column positions of a CSV file resolved from its header.
struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn from_header(header: &ByteRecord) -> Result<Self> {
        let names = header
            .iter()
            .enumerate()
            .map(|(i, field)| {
                std::str::from_utf8(field)
                    .map(|s| s.trim().to_string())
                    .map_err(|_| TocsinError::input_type(format!("header column {i} is not text")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Columns { names })
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| TocsinError::dataset(format!("missing column '{name}'")))
    }
}

pub(crate) fn text_field<'r>(record: &'r ByteRecord, column: usize, name: &str) -> Result<&'r str> {
    let line = record.position().map_or(0, |p| p.line());
    let bytes = record
        .get(column)
        .ok_or_else(|| TocsinError::dataset(format!("line {line}: missing '{name}' field")))?;
    std::str::from_utf8(bytes)
        .map_err(|_| TocsinError::input_type(format!("line {line}: '{name}' is not valid text")))
}

pub(crate) fn id_field(record: &ByteRecord, column: usize) -> Result<i64> {
    let text = text_field(record, column, "id")?;
    text.trim().parse().map_err(|_| {
        let line = record.position().map_or(0, |p| p.line());
        TocsinError::dataset(format!("line {line}: id '{text}' is not an integer"))
    })
}

pub(crate) fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().has_headers(true).from_reader(input)
}

/// Read `id,message,original,genre` rows.
pub fn read_messages<R: Read>(input: R) -> Result<Vec<Message>> {
    let mut reader = csv_reader(input);
    let columns = Columns::from_header(reader.byte_headers()?)?;
    let id = columns.position("id")?;
    let message = columns.position("message")?;
    let original = columns.position("original")?;
    let genre = columns.position("genre")?;

    let mut messages = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let original = text_field(&record, original, "original")?;
        messages.push(Message {
            id: id_field(&record, id)?,
            message: text_field(&record, message, "message")?.to_string(),
            original: (!original.is_empty()).then(|| original.to_string()),
            genre: text_field(&record, genre, "genre")?.to_string(),
        });
    }
    Ok(messages)
}

/// Read `id,categories` rows.
pub fn read_categories<R: Read>(input: R) -> Result<Vec<CategoryRecord>> {
    let mut reader = csv_reader(input);
    let columns = Columns::from_header(reader.byte_headers()?)?;
    let id = columns.position("id")?;
    let categories = columns.position("categories")?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(CategoryRecord {
            id: id_field(&record, id)?,
            categories: text_field(&record, categories, "categories")?.to_string(),
        });
    }
    Ok(rows)
}

/// Load the messages file.
pub fn load_messages<P: AsRef<Path>>(path: P) -> Result<Vec<Message>> {
    read_messages(File::open(path.as_ref())?)
}

/// Load the categories file.
pub fn load_categories<P: AsRef<Path>>(path: P) -> Result<Vec<CategoryRecord>> {
    read_categories(File::open(path.as_ref())?)
}

/// Read one message per line. A line is either a JSON string or an object
/// with a string `message` field; blank lines are skipped.
pub fn read_jsonl_messages<R: BufRead>(input: R) -> Result<Vec<String>> {
    let mut messages = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)?;
        let text = match value {
            Value::String(text) => text,
            Value::Object(mut object) => match object.remove("message") {
                Some(Value::String(text)) => text,
                Some(other) => {
                    return Err(TocsinError::input_type(format!(
                        "line {}: message must be a string, got {other}",
                        number + 1
                    )));
                }
                None => {
                    return Err(TocsinError::dataset(format!(
                        "line {}: object has no 'message' field",
                        number + 1
                    )));
                }
            },
            other => {
                return Err(TocsinError::input_type(format!(
                    "line {}: expected a string or object, got {other}",
                    number + 1
                )));
            }
        };
        messages.push(text);
    }
    Ok(messages)
}

/// Load a JSON-lines file of messages.
pub fn load_jsonl_messages<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    read_jsonl_messages(BufReader::new(File::open(path.as_ref())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_messages() {
        let csv = "id,message,original,genre\n\
                   2,Weather update - a cold front,Un front froid,direct\n\
                   7,\"Is the Hurricane over, or not?\",,social\n";
        let messages = read_messages(csv.as_bytes()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, 2);
        assert_eq!(messages[0].original.as_deref(), Some("Un front froid"));
        assert_eq!(messages[1].message, "Is the Hurricane over, or not?");
        assert_eq!(messages[1].original, None);
        assert_eq!(messages[1].genre, "social");
    }

    #[test]
    fn test_non_text_message_is_input_type_error() {
        let mut bytes = b"id,message,original,genre\n1,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00]);
        bytes.extend_from_slice(b",,news\n");

        let result = read_messages(bytes.as_slice());
        assert!(matches!(result, Err(TocsinError::InputType(_))));
    }

    #[test]
    fn test_read_categories() {
        let csv = "id,categories\n2,related-1;request-0\n";
        let rows = read_categories(csv.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![CategoryRecord {
                id: 2,
                categories: "related-1;request-0".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_column() {
        let result = read_categories("id,labels\n1,x\n".as_bytes());
        assert!(matches!(result, Err(TocsinError::Dataset(_))));
    }

    #[test]
    fn test_bad_id() {
        let result = read_categories("id,categories\nabc,related-1\n".as_bytes());
        assert!(matches!(result, Err(TocsinError::Dataset(_))));
    }

    #[test]
    fn test_read_jsonl() {
        let input = "\"we need water\"\n\n{\"message\": \"send tents\", \"id\": 4}\n";
        let messages = read_jsonl_messages(input.as_bytes()).unwrap();
        assert_eq!(messages, vec!["we need water", "send tents"]);

        let result = read_jsonl_messages("{\"message\": 12}\n".as_bytes());
        assert!(matches!(result, Err(TocsinError::InputType(_))));

        let result = read_jsonl_messages("[1, 2]\n".as_bytes());
        assert!(matches!(result, Err(TocsinError::InputType(_))));
    }
}

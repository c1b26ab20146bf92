//! The cleaned, labelled message table.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ahash::AHashMap;
use csv::WriterBuilder;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::categories::{DROPPED_CATEGORY, RELATED_CATEGORY, parse_blob};
use crate::data::reader::{CategoryRecord, Message, csv_reader, id_field, text_field};
use crate::error::{Result, TocsinError};
use crate::ml::matrix::LabelMatrix;

/// Leading columns of a saved dataset, before the category columns.
const MESSAGE_COLUMNS: [&str; 4] = ["id", "message", "original", "genre"];

/// A message joined with its raw category blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub message: Message,
    pub categories: String,
}

/// Inner join of messages and category rows on `id`, in message order.
///
/// An id present several times on either side yields every pairing.
pub fn merge(messages: Vec<Message>, categories: Vec<CategoryRecord>) -> Vec<MergedRecord> {
    let mut by_id: AHashMap<i64, Vec<String>> = AHashMap::new();
    for record in categories {
        by_id.entry(record.id).or_default().push(record.categories);
    }

    let mut merged = Vec::with_capacity(messages.len());
    for message in messages {
        if let Some(blobs) = by_id.get(&message.id) {
            for blob in blobs {
                merged.push(MergedRecord {
                    message: message.clone(),
                    categories: blob.clone(),
                });
            }
        }
    }
    debug!("Merged into {} records", merged.len());
    merged
}

/// Expand the category blobs into 0/1 columns.
///
/// Column names come from the first record's blob. Rows repeating an
/// `(id, message)` pair are dropped, the [`DROPPED_CATEGORY`] column is
/// removed, and a `related` value of 2 becomes 1. Any other value outside
/// {0, 1} is an error.
pub fn clean(records: Vec<MergedRecord>) -> Result<Dataset> {
    let Some(first) = records.first() else {
        return Err(TocsinError::dataset("no records to clean"));
    };
    let raw_names: Vec<String> = parse_blob(&first.categories)?
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();

    let dropped = raw_names.iter().position(|name| name == DROPPED_CATEGORY);
    let related = raw_names.iter().position(|name| name == RELATED_CATEGORY);
    let categories: Vec<String> = raw_names
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != dropped)
        .map(|(_, name)| name.clone())
        .collect();

    let mut seen: HashSet<(i64, String)> = HashSet::new();
    let mut messages = Vec::new();
    let mut rows = Vec::new();
    let total = records.len();

    for record in records {
        if !seen.insert((record.message.id, record.message.message.clone())) {
            continue;
        }

        let parsed = parse_blob(&record.categories)?;
        if parsed.len() != raw_names.len() {
            return Err(TocsinError::dataset(format!(
                "message {} has {} categories, expected {}",
                record.message.id,
                parsed.len(),
                raw_names.len()
            )));
        }

        let mut row = Vec::with_capacity(categories.len());
        for (i, ((name, value), expected)) in parsed.into_iter().zip(&raw_names).enumerate() {
            if name != expected {
                return Err(TocsinError::dataset(format!(
                    "message {}: category {i} is '{name}', expected '{expected}'",
                    record.message.id
                )));
            }
            if Some(i) == dropped {
                continue;
            }
            let value = match value {
                0 | 1 => value,
                2 if Some(i) == related => 1,
                other => {
                    return Err(TocsinError::dataset(format!(
                        "message {}: category '{name}' has value {other}",
                        record.message.id
                    )));
                }
            };
            row.push(value);
        }

        messages.push(record.message);
        rows.push(row);
    }

    info!(
        "Cleaned {} records into {} rows across {} categories",
        total,
        messages.len(),
        categories.len()
    );
    Dataset::new(messages, LabelMatrix::new(categories, rows)?)
}

/// Messages with their category labels, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    messages: Vec<Message>,
    labels: LabelMatrix,
}

impl Dataset {
    pub fn new(messages: Vec<Message>, labels: LabelMatrix) -> Result<Self> {
        if messages.len() != labels.n_rows() {
            return Err(TocsinError::schema_mismatch(format!(
                "{} messages but {} label rows",
                messages.len(),
                labels.n_rows()
            )));
        }
        Ok(Dataset { messages, labels })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn labels(&self) -> &LabelMatrix {
        &self.labels
    }

    pub fn categories(&self) -> &[String] {
        self.labels.categories()
    }

    /// The message texts, in row order.
    pub fn texts(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.message.clone()).collect()
    }

    /// The rows at `indices`, in that order. Indices past the end are
    /// skipped in messages and labels alike.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        let kept: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.len())
            .collect();
        Dataset {
            messages: kept.iter().map(|&i| self.messages[i].clone()).collect(),
            labels: self.labels.select_rows(&kept),
        }
    }

    /// Shuffle with `seed` and split off a `test_size` fraction (rounded up)
    /// as the test set. Returns `(train, test)`.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if test_size.is_nan() || test_size <= 0.0 || test_size >= 1.0 {
            return Err(TocsinError::invalid_argument(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }

        let n = self.len();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(TocsinError::invalid_argument(format!(
                "test_size {test_size} leaves an empty split of {n} rows"
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test, train) = indices.split_at(n_test);
        Ok((self.select(train), self.select(test)))
    }

    /// Write the table as CSV: message columns then one column per category.
    pub fn write<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(output);

        let header: Vec<&str> = MESSAGE_COLUMNS
            .iter()
            .copied()
            .chain(self.categories().iter().map(String::as_str))
            .collect();
        writer.write_record(&header)?;

        for (message, row) in self.messages.iter().zip(self.labels.rows()) {
            let mut record = vec![
                message.id.to_string(),
                message.message.clone(),
                message.original.clone().unwrap_or_default(),
                message.genre.clone(),
            ];
            record.extend(row.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a table written by [`Dataset::write`].
    pub fn read<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv_reader(input);
        let header = reader.byte_headers()?.clone();
        let names = header
            .iter()
            .map(|field| {
                std::str::from_utf8(field)
                    .map(str::to_string)
                    .map_err(|_| TocsinError::input_type("dataset header is not text"))
            })
            .collect::<Result<Vec<_>>>()?;
        if names.len() <= MESSAGE_COLUMNS.len()
            || names[..MESSAGE_COLUMNS.len()] != MESSAGE_COLUMNS
        {
            return Err(TocsinError::dataset(format!(
                "dataset must start with columns {} followed by categories",
                MESSAGE_COLUMNS.join(",")
            )));
        }
        let categories = names[MESSAGE_COLUMNS.len()..].to_vec();

        let mut messages = Vec::new();
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            let original = text_field(&record, 2, "original")?;
            messages.push(Message {
                id: id_field(&record, 0)?,
                message: text_field(&record, 1, "message")?.to_string(),
                original: (!original.is_empty()).then(|| original.to_string()),
                genre: text_field(&record, 3, "genre")?.to_string(),
            });

            let row = categories
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    match text_field(&record, MESSAGE_COLUMNS.len() + i, name)?.trim() {
                        "0" => Ok(0),
                        "1" => Ok(1),
                        other => Err(TocsinError::dataset(format!(
                            "message {}: category '{name}' has value '{other}'",
                            messages.last().map_or(0, |m| m.id)
                        ))),
                    }
                })
                .collect::<Result<Vec<u8>>>()?;
            rows.push(row);
        }

        Dataset::new(messages, LabelMatrix::new(categories, rows)?)
    }

    /// Save the table to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write(File::create(path.as_ref())?)?;
        info!("Saved {} rows to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    /// Load a table saved with [`Dataset::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(File::open(path.as_ref())?)
    }
}

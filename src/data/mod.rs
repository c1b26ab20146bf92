//! Loading, cleaning and persisting the labelled message table.
//!
//! The raw input is two CSV files: `id,message,original,genre` and
//! `id,categories`, where `categories` packs every label into one
//! `related-1;request-0;...` string. [`merge`] joins them on `id` and
//! [`clean`] expands the labels into a [`Dataset`].

pub mod categories;
pub mod dataset;
pub mod reader;

pub use categories::{CATEGORY_NAMES, DROPPED_CATEGORY, RAW_CATEGORY_NAMES, category_names};
pub use dataset::{Dataset, MergedRecord, clean, merge};
pub use reader::{
    CategoryRecord, Message, load_categories, load_jsonl_messages, load_messages,
    read_categories, read_jsonl_messages, read_messages,
};

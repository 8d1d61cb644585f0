//! Record stores for the trading journal.
//!
//! This crate provides:
//! - [`CsvTradeStore`]: append-only CSV file shared by every user
//! - [`DocumentDatabase`]: per-user document collections with update,
//!   delete, and change notification, optionally mirrored to JSON

pub mod csv_storage;
pub mod document_store;

pub use csv_storage::{read_journal, CsvJournalProvider, CsvTradeStore, CSV_HEADER};
pub use document_store::{
    trades_path, DocumentDatabase, DocumentJournalProvider, DocumentTradeStore,
};

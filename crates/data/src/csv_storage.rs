//! Append-only CSV journal.
//!
//! The file carries a fixed 14-column header and one row per trade. Rows are
//! never rewritten, so update and delete are not supported. A missing file
//! reads as an empty journal.

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use trade_journal_core::{
    parse_decimal_lenient, Direction, Identity, JournalProvider, NewTrade, RuleCompliance,
    StoreCapabilities, StoreError, StoreEvent, TradeRecord, TradeStore,
};
use tracing::{debug, info, warn};

/// Column names, in file order.
///
/// Header text must match existing journal files byte-for-byte.
pub const CSV_HEADER: [&str; 14] = [
    "Sl No.",
    "Script Name",
    "Time",
    "Long/Short",
    "Entry Price",
    "SL",
    "Quantity",
    "% of Account Risked",
    "Target Price",
    "Exit Price",
    "Exit Time",
    "R/R",
    "P/L",
    "Did I followd MY RUES?",
];

const EVENT_CAPACITY: usize = 64;

/// One data row as text, keyed by header name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "Sl No.")]
    sl_no: String,
    #[serde(rename = "Script Name")]
    script_name: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Long/Short")]
    long_short: String,
    #[serde(rename = "Entry Price")]
    entry_price: String,
    #[serde(rename = "SL")]
    sl: String,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "% of Account Risked")]
    account_risked: String,
    #[serde(rename = "Target Price")]
    target_price: String,
    #[serde(rename = "Exit Price")]
    exit_price: String,
    #[serde(rename = "Exit Time")]
    exit_time: String,
    #[serde(rename = "R/R")]
    rr: String,
    #[serde(rename = "P/L")]
    pl: String,
    #[serde(rename = "Did I followd MY RUES?")]
    follow_rules: String,
}

impl CsvRow {
    /// Converts a row into a record. `line` is the 1-based file line.
    ///
    /// An unreadable `Sl No.` falls back to the row's position and an
    /// unreadable rule cell to the default, so hand-edited files still load.
    /// Only an unknown direction rejects the row.
    fn into_record(self, line: u64) -> Result<TradeRecord, StoreError> {
        let sl_no: u64 = self.sl_no.trim().parse().unwrap_or_else(|_| {
            warn!(line, value = %self.sl_no, "Unreadable Sl No., using row position");
            line - 1
        });
        let direction = self
            .long_short
            .parse::<Direction>()
            .map_err(|e| StoreError::Malformed {
                line,
                message: format!("{e}"),
            })?;
        let followed_rules = if self.follow_rules.trim().is_empty() {
            Default::default()
        } else {
            self.follow_rules.parse::<RuleCompliance>().unwrap_or_else(|e| {
                warn!(line, error = %e, "Unreadable rule cell, using default");
                Default::default()
            })
        };
        let text = |raw: String| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let trade = NewTrade {
            script_name: self.script_name.trim().to_string(),
            time: self.time.trim().to_string(),
            direction,
            entry_price: parse_decimal_lenient(&self.entry_price),
            stop_loss: parse_decimal_lenient(&self.sl),
            quantity: parse_decimal_lenient(&self.quantity),
            account_risked: text(self.account_risked),
            target_price: parse_decimal_lenient(&self.target_price),
            exit_price: parse_decimal_lenient(&self.exit_price),
            exit_time: text(self.exit_time),
            risk_reward: text(self.rr),
            pl: parse_decimal_lenient(&self.pl),
            followed_rules,
        };

        Ok(TradeRecord::new(sl_no.to_string(), sl_no, trade))
    }
}

fn csv_error(err: csv::Error) -> StoreError {
    StoreError::Csv(err.to_string())
}

fn record_fields(record: &TradeRecord) -> [String; 14] {
    let trade = &record.trade;
    let number = |value: Option<rust_decimal::Decimal>| {
        value.map(|d| d.to_string()).unwrap_or_default()
    };
    [
        record.sl_no.to_string(),
        trade.script_name.clone(),
        trade.time.clone(),
        trade.direction.to_string(),
        number(trade.entry_price),
        number(trade.stop_loss),
        number(trade.quantity),
        trade.account_risked.clone().unwrap_or_default(),
        number(trade.target_price),
        number(trade.exit_price),
        trade.exit_time.clone().unwrap_or_default(),
        trade.risk_reward.clone().unwrap_or_default(),
        number(trade.pl),
        trade.followed_rules.to_string(),
    ]
}

/// Reads every trade from a journal file. A missing file yields no trades.
///
/// Rows that cannot be read are logged and skipped.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn read_journal(path: &Path) -> Result<Vec<TradeRecord>, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "Journal file missing, treating as empty");
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Line 1 is the header.
        let line = index as u64 + 2;
        let parsed = row
            .map_err(csv_error)
            .and_then(|row| row.into_record(line));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), line, error = %e, "Skipping unreadable journal row");
            }
        }
    }
    records.sort_by_key(|r| r.sl_no);
    Ok(records)
}

/// Writes the header row if the file is absent or empty.
fn ensure_header(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let is_empty = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if is_empty {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new().from_writer(file);
        writer.write_record(CSV_HEADER).map_err(csv_error)?;
        writer.flush()?;
        info!(path = %path.display(), "Created journal file");
    }
    Ok(())
}

/// Appends `trade` with the next sequence number and returns the stored record.
fn append_row(path: &Path, trade: NewTrade) -> Result<TradeRecord, StoreError> {
    ensure_header(path)?;

    let next = read_journal(path)?
        .iter()
        .map(|r| r.sl_no)
        .max()
        .unwrap_or(0)
        + 1;
    let record = TradeRecord::new(next.to_string(), next, trade);

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(record_fields(&record)).map_err(csv_error)?;
    writer.flush()?;

    Ok(record)
}

/// Journal persisted as a single CSV file.
pub struct CsvTradeStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl CsvTradeStore {
    /// Opens the journal at `path`, creating it with a header if needed.
    ///
    /// # Errors
    /// Returns an error if the file or its parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        ensure_header(&path)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            events,
        })
    }
}

#[async_trait]
impl TradeStore for CsvTradeStore {
    async fn append(&self, trade: NewTrade) -> Result<TradeRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let record = tokio::task::spawn_blocking(move || append_row(&path, trade)).await??;

        info!(sl_no = record.sl_no, script = %record.trade.script_name, "Appended trade");
        let _ = self.events.send(StoreEvent::Added(record.clone()));
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_journal(&path)).await?
    }

    async fn update(&self, _id: &str, _trade: NewTrade) -> Result<TradeRecord, StoreError> {
        Err(StoreError::Unsupported("update"))
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("delete"))
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            update: false,
            delete: false,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

/// Every user shares the one CSV journal.
pub struct CsvJournalProvider {
    store: Arc<CsvTradeStore>,
}

impl CsvJournalProvider {
    #[must_use]
    pub const fn new(store: Arc<CsvTradeStore>) -> Self {
        Self { store }
    }
}

impl JournalProvider for CsvJournalProvider {
    fn store_for(&self, _identity: &Identity) -> Arc<dyn TradeStore> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use trade_journal_core::summarize;

    fn temp_path() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trading_journal.csv");
        (dir, path)
    }

    fn make_trade(script: &str, pl: rust_decimal::Decimal) -> NewTrade {
        NewTrade {
            script_name: script.to_string(),
            time: "09:15".to_string(),
            direction: Direction::Long,
            entry_price: Some(dec!(100.25)),
            stop_loss: Some(dec!(95)),
            quantity: Some(dec!(10)),
            account_risked: Some("2%".to_string()),
            target_price: None,
            exit_price: Some(dec!(110)),
            exit_time: Some("14:30".to_string()),
            risk_reward: Some("1:2".to_string()),
            pl: Some(pl),
            followed_rules: RuleCompliance::No,
        }
    }

    #[test]
    fn test_open_writes_header_once() {
        let (_dir, path) = temp_path();
        CsvTradeStore::open(&path).unwrap();
        CsvTradeStore::open(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(
            content.trim_end(),
            "Sl No.,Script Name,Time,Long/Short,Entry Price,SL,Quantity,% of Account Risked,\
             Target Price,Exit Price,Exit Time,R/R,P/L,Did I followd MY RUES?"
        );
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, path) = temp_path();
        assert!(read_journal(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_sequence() {
        let (_dir, path) = temp_path();
        let store = CsvTradeStore::open(&path).unwrap();

        let first = store.append(make_trade("INFY", dec!(120))).await.unwrap();
        let second = store.append(make_trade("TCS", dec!(-40))).await.unwrap();

        assert_eq!(first.sl_no, 1);
        assert_eq!(second.sl_no, 2);
        assert_ne!(first.id, second.id);

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_written_row_matches_columns() {
        let (_dir, path) = temp_path();
        let store = CsvTradeStore::open(&path).unwrap();
        store.append(make_trade("INFY", dec!(120))).await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(row, "1,INFY,09:15,Long,100.25,95,10,2%,,110,14:30,1:2,120,No");
    }

    #[tokio::test]
    async fn test_update_and_delete_unsupported() {
        let (_dir, path) = temp_path();
        let store = CsvTradeStore::open(&path).unwrap();
        let record = store.append(make_trade("INFY", dec!(1))).await.unwrap();

        assert!(matches!(
            store.update(&record.id, make_trade("INFY", dec!(2))).await,
            Err(StoreError::Unsupported("update"))
        ));
        assert!(matches!(
            store.delete(&record.id).await,
            Err(StoreError::Unsupported("delete"))
        ));
        assert!(!store.capabilities().update);
    }

    #[tokio::test]
    async fn test_non_numeric_pl_aggregates_as_zero() {
        let (_dir, path) = temp_path();
        fs::write(
            &path,
            format!(
                "{}\n1,SBIN,10:00,Long,500,,5,,,510,,,50,Yes\n2,SBIN,11:00,Short,510,,5,,,500,,,oops,Yes\n3,SBIN,12:00,short,500,,5,,,505,,,-25,no\n",
                CSV_HEADER.join(",")
            ),
        )
        .unwrap();

        let store = CsvTradeStore::open(&path).unwrap();
        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].trade.pl, None);
        assert_eq!(records[2].trade.direction, Direction::Short);
        assert_eq!(records[2].trade.followed_rules, RuleCompliance::No);

        let summary = summarize(&records);
        assert_eq!(summary.total_pl, dec!(25));
        assert_eq!(summary.break_even_trades, 1);
    }

    #[tokio::test]
    async fn test_sequence_continues_after_gap() {
        let (_dir, path) = temp_path();
        fs::write(
            &path,
            format!(
                "{}\n1,A,,Long,1,,1,,,1,,,0,Yes\n5,B,,Long,1,,1,,,1,,,0,Yes\n",
                CSV_HEADER.join(",")
            ),
        )
        .unwrap();

        let store = CsvTradeStore::open(&path).unwrap();
        let record = store.append(make_trade("C", dec!(1))).await.unwrap();
        assert_eq!(record.sl_no, 6);
    }

    #[tokio::test]
    async fn test_hand_edited_rows_do_not_hide_the_journal() {
        let (_dir, path) = temp_path();
        fs::write(
            &path,
            format!(
                "{}\n1,A,,Long,1,,1,,,1,,,40,Yes\n2,B,,Flat,1,,1,,,1,,,99,Yes\n\
                 ?,C,,Short,1,,1,,,1,,,-10,Yes\n4,D,,Long,1,,1,,,1,,,5,maybe\n",
                CSV_HEADER.join(",")
            ),
        )
        .unwrap();

        let records = read_journal(&path).unwrap();
        let scripts: Vec<_> = records.iter().map(|r| r.trade.script_name.as_str()).collect();
        assert_eq!(scripts, vec!["A", "C", "D"]);
        // Unreadable Sl No. takes the row position.
        assert_eq!(records[1].sl_no, 3);
        assert_eq!(records[2].trade.followed_rules, RuleCompliance::Yes);

        let summary = summarize(&records);
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.total_pl, dec!(35));

        let store = CsvTradeStore::open(&path).unwrap();
        let next = store.append(make_trade("E", dec!(1))).await.unwrap();
        assert_eq!(next.sl_no, 5);
    }

    #[tokio::test]
    async fn test_append_notifies_subscribers() {
        let (_dir, path) = temp_path();
        let store = CsvTradeStore::open(&path).unwrap();
        let mut rx = store.subscribe();

        let record = store.append(make_trade("HDFC", dec!(7))).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::Added(record));
    }

    #[tokio::test]
    async fn test_provider_shares_one_store() {
        let (_dir, path) = temp_path();
        let provider = CsvJournalProvider::new(Arc::new(CsvTradeStore::open(&path).unwrap()));

        provider
            .store_for(&Identity::token("alice"))
            .append(make_trade("A", dec!(1)))
            .await
            .unwrap();
        let seen = provider
            .store_for(&Identity::anonymous())
            .list_all()
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::address::Address;
use super::parse::parse_history_output;
use super::transaction::Transaction;

/// Most recent entries kept per fetch.
pub const MAX_HISTORY: usize = 1000;

/// What a source returns for one address.
#[derive(Clone, Debug, Default)]
pub struct History {
    /// Ordered oldest to newest, capped by the source.
    pub transactions: Vec<Transaction>,
    /// Records the source dropped because they could not be read.
    pub skipped: usize,
}

pub trait TransactionSource {
    fn fetch_history(&self, address: &Address) -> Result<History>;
}

/// Reads a block-explorer `txlist` export from disk.
#[derive(Clone, Debug)]
pub struct JsonExportSource {
    path: PathBuf,
    limit: usize,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: MAX_HISTORY,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}

impl TransactionSource for JsonExportSource {
    fn fetch_history(&self, address: &Address) -> Result<History> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read history export {}", self.path.display()))?;

        let parsed = parse_history_output(&raw)
            .with_context(|| format!("failed to parse history export {}", self.path.display()))?;
        let mut skipped = parsed.skipped;

        let mut entries = parsed.entries;
        entries.retain(|entry| entry.involves(address));
        // Stable: entries within one block keep export order.
        entries.sort_by_key(|entry| entry.block().unwrap_or(0));

        let mut transactions = Vec::with_capacity(entries.len());
        for entry in entries {
            let block = entry.block();
            match entry.into_transaction() {
                Ok(transaction) => transactions.push(transaction),
                Err(error) => {
                    warn!(block, "skipping history entry: {error:#}");
                    skipped += 1;
                }
            }
        }

        let total = transactions.len();
        if total > self.limit {
            transactions.drain(..total - self.limit);
        }

        debug!(
            address = %address,
            total,
            kept = transactions.len(),
            skipped,
            "loaded transaction history"
        );
        Ok(History {
            transactions,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn export_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn keeps_only_transactions_involving_the_address() {
        let file = export_file(
            r#"[
                {"blockNumber": "2", "from": "0xAA", "to": "0xBB", "value": "1"},
                {"blockNumber": "1", "from": "0xCC", "to": "0xDD", "value": "1"},
                {"blockNumber": "3", "from": "0xEE", "to": "0xaa", "value": "1"}
            ]"#,
        );

        let source = JsonExportSource::new(file.path());
        let history = source
            .fetch_history(&Address::new("0xAa"))
            .unwrap()
            .transactions;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender.as_str(), "0xaa");
        assert_eq!(history[1].sender.as_str(), "0xee");
    }

    #[test]
    fn caps_to_most_recent_entries_in_block_order() {
        let entries = (0..12)
            .rev()
            .map(|block| {
                format!(r#"{{"blockNumber": "{block}", "from": "0xaa", "to": "0x{block:02x}", "value": "1"}}"#)
            })
            .collect::<Vec<_>>()
            .join(",");
        let file = export_file(&format!("[{entries}]"));

        let source = JsonExportSource::new(file.path()).with_limit(5);
        let history = source
            .fetch_history(&Address::new("0xaa"))
            .unwrap()
            .transactions;
        let recipients = history
            .iter()
            .map(|tx| tx.recipient.as_ref().unwrap().as_str().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(recipients, ["0x07", "0x08", "0x09", "0x0a", "0x0b"]);
    }

    #[test]
    fn hex_block_numbers_sort_with_decimal_ones() {
        let file = export_file(
            r#"[
                {"blockNumber": "0x1a", "from": "0xaa", "to": "0x03", "value": "1"},
                {"blockNumber": "25", "from": "0xaa", "to": "0x02", "value": "1"},
                {"blockNumber": "0x01", "from": "0xaa", "to": "0x01", "value": "1"}
            ]"#,
        );

        let source = JsonExportSource::new(file.path()).with_limit(2);
        let history = source.fetch_history(&Address::new("0xaa")).unwrap();
        let blocks = history
            .transactions
            .iter()
            .map(|tx| tx.block)
            .collect::<Vec<_>>();
        assert_eq!(blocks, [Some(25), Some(26)]);
    }

    #[test]
    fn unrelated_bad_record_does_not_fail_the_fetch() {
        let file = export_file(
            r#"[
                {"blockNumber": "1", "from": "0xaa", "to": "0xbb", "value": "1"},
                {"blockNumber": "2", "from": "0xcc", "to": "0xdd", "value": "garbage"},
                {"blockNumber": "3", "from": "0xbb", "to": "0xaa", "value": "2"}
            ]"#,
        );

        let source = JsonExportSource::new(file.path());
        let history = source.fetch_history(&Address::new("0xa")).unwrap();
        assert!(history.transactions.is_empty());

        let history = source.fetch_history(&Address::new("0xaa")).unwrap();
        assert_eq!(history.transactions.len(), 2);
        assert_eq!(history.skipped, 0);
    }

    #[test]
    fn bad_records_for_the_address_are_skipped_and_counted() {
        let file = export_file(
            r#"[
                {"blockNumber": "1", "from": "0xaa", "to": "0xbb", "value": "1"},
                {"blockNumber": "2", "from": "0xaa", "to": "0xcc", "value": "1.5"},
                {"blockNumber": "3", "to": "0xaa", "value": "1"},
                {"blockNumber": "4", "from": "0xdd", "to": "0xaa", "value": "3"}
            ]"#,
        );

        let source = JsonExportSource::new(file.path());
        let history = source.fetch_history(&Address::new("0xaa")).unwrap();
        let senders = history
            .transactions
            .iter()
            .map(|tx| tx.sender.as_str())
            .collect::<Vec<_>>();
        assert_eq!(senders, ["0xaa", "0xdd"]);
        assert_eq!(history.skipped, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = JsonExportSource::new("/definitely/not/here.json");
        assert!(source.fetch_history(&Address::new("0xaa")).is_err());
    }
}

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ethers::types::TxHash;

/// One submitted transaction, as recorded for later display.
#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub summary: String,
    pub submitted_at: DateTime<Utc>,
}

/// In-memory sink for submitted transactions. The pipeline only writes to
/// it; display surfaces read it back.
#[derive(Default)]
pub struct TransactionRegistry {
    entries: DashMap<TxHash, SubmittedTransaction>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, hash: TxHash, summary: String) {
        self.entries.insert(
            hash,
            SubmittedTransaction {
                hash,
                summary,
                submitted_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, hash: &TxHash) -> Option<SubmittedTransaction> {
        self.entries.get(hash).map(|entry| entry.value().clone())
    }

    /// All recorded transactions, oldest first.
    pub fn all(&self) -> Vec<SubmittedTransaction> {
        let mut entries: Vec<SubmittedTransaction> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.submitted_at);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// 📒 Transaction Ledger - Append-only audit trail
// One record per checkout, closed in place by the matching return.
// The ledger is the source of truth for "is this tool out, and to whom" -
// it verifies its own invariants instead of trusting the catalog.

use crate::error::CheckoutError;
use crate::tool::ToolCondition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

// ============================================================================
// TRANSACTION KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Open lifecycle: tool is out, return_time is None
    Checkout,

    /// Closed lifecycle: return processed, return_time stamped
    Return,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Checkout => "checkout",
            TransactionKind::Return => "return",
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// One checkout lifecycle.
///
/// Created as an open checkout; the matching return stamps `return_time`,
/// stores the observed condition and flips `kind` to `Return`. Records are
/// mutated in place on return and never deleted - they are the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Stable identity (UUID v4) - collision-free, unlike the
    /// timestamp-derived ids this replaces
    pub id: String,

    pub tool_id: String,

    pub employee_id: String,

    pub kind: TransactionKind,

    pub checkout_time: DateTime<Utc>,

    /// None while the checkout is still open
    pub return_time: Option<DateTime<Utc>>,

    /// Condition observed when the tool came back
    pub return_condition: Option<ToolCondition>,

    pub notes: Option<String>,
}

impl TransactionRecord {
    /// Open checkout record, stamped now
    pub fn new_checkout(tool_id: &str, employee_id: &str) -> Self {
        TransactionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            tool_id: tool_id.to_string(),
            employee_id: employee_id.to_string(),
            kind: TransactionKind::Checkout,
            checkout_time: Utc::now(),
            return_time: None,
            return_condition: None,
            notes: None,
        }
    }

    /// Still out (no return recorded yet)
    pub fn is_open(&self) -> bool {
        self.return_time.is_none()
    }
}

// ============================================================================
// TRANSACTION LEDGER
// ============================================================================

/// Append-only log of checkout/return events, insertion order.
///
/// Appends and closes take the write lock; queries clone out of the read
/// lock, so re-querying always reflects current state rather than a
/// frozen snapshot.
#[derive(Clone)]
pub struct TransactionLedger {
    records: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        TransactionLedger {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Append a new open checkout for the tool.
    ///
    /// The no-open-record check runs under the same write lock as the
    /// append, so two racing checkouts of one tool cannot both land.
    /// `DuplicateOpenCheckout` here means catalog and ledger disagree.
    pub fn record_checkout(
        &self,
        tool_id: &str,
        employee_id: &str,
    ) -> Result<TransactionRecord, CheckoutError> {
        let mut records = self.records.write().unwrap();

        if records.iter().any(|r| r.tool_id == tool_id && r.is_open()) {
            return Err(CheckoutError::DuplicateOpenCheckout {
                tool_id: tool_id.to_string(),
            });
        }

        let record = TransactionRecord::new_checkout(tool_id, employee_id);
        records.push(record.clone());
        Ok(record)
    }

    /// Open checkout for this tool/user pair.
    ///
    /// If several somehow match (invariant already violated) the most
    /// recently created one wins, so the return closes the newest record.
    pub fn find_open_checkout(
        &self,
        tool_id: &str,
        employee_id: &str,
    ) -> Option<TransactionRecord> {
        let records = self.records.read().unwrap();
        records
            .iter()
            .rev()
            .find(|r| {
                r.tool_id == tool_id
                    && r.employee_id == employee_id
                    && r.kind == TransactionKind::Checkout
                    && r.is_open()
            })
            .cloned()
    }

    /// Any open record for the tool, regardless of holder
    pub fn has_open_checkout(&self, tool_id: &str) -> bool {
        let records = self.records.read().unwrap();
        records.iter().any(|r| r.tool_id == tool_id && r.is_open())
    }

    /// Close a record in place: stamp return time, store condition/notes.
    ///
    /// Closing twice fails with `AlreadyReturned` - the first return's
    /// data is never overwritten.
    pub fn record_return(
        &self,
        record_id: &str,
        condition: ToolCondition,
        notes: &str,
    ) -> Result<TransactionRecord, CheckoutError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| CheckoutError::NoOpenCheckout {
                tool_id: record_id.to_string(),
            })?;

        if !record.is_open() {
            return Err(CheckoutError::AlreadyReturned {
                transaction_id: record.id.clone(),
            });
        }

        record.return_time = Some(Utc::now());
        record.kind = TransactionKind::Return;
        record.return_condition = Some(condition);
        record.notes = if notes.is_empty() {
            None
        } else {
            Some(notes.to_string())
        };

        Ok(record.clone())
    }

    /// All records for an employee, insertion order.
    ///
    /// Each call re-queries the ledger, so callers polling for history
    /// see returns that closed since the last call.
    pub fn history_for(&self, employee_id: &str) -> Vec<TransactionRecord> {
        let records = self.records.read().unwrap();
        records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// Full ledger copy, insertion order
    pub fn all_records(&self) -> Vec<TransactionRecord> {
        self.records.read().unwrap().clone()
    }

    /// Records still open (tools currently out)
    pub fn open_records(&self) -> Vec<TransactionRecord> {
        let records = self.records.read().unwrap();
        records.iter().filter(|r| r.is_open()).cloned().collect()
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ⚠️ Error Taxonomy - Business rejections vs invariant breaches
// Expected outcomes (tool not found, not the holder, ...) are normal results
// the caller handles. Invariant breaches mean catalog and ledger disagree
// and the operation must abort loudly instead of limping on.

use serde::{Deserialize, Serialize};

/// Every way a checkout or return can fail.
///
/// The first group is recoverable by the caller (re-login, pick another
/// tool). The second group indicates the core itself is in an inconsistent
/// state; see [`CheckoutError::is_invariant_breach`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckoutError {
    /// Operation requires an authenticated session
    NotAuthenticated,

    /// Credential lookup rejected the username/secret pair
    AuthFailed,

    /// No tool matches the scanned barcode (or tool id)
    ToolNotFound { tool: String },

    /// Tool exists but is not available for checkout
    ToolUnavailable { tool_id: String, status: String },

    /// Return attempted by someone other than the recorded holder
    NotHolder { tool_id: String },

    /// Catalog says checked out, but the ledger has no open record
    NoOpenCheckout { tool_id: String },

    /// Ledger already has an open checkout for this tool
    DuplicateOpenCheckout { tool_id: String },

    /// Return processed twice against the same ledger record
    AlreadyReturned { transaction_id: String },

    /// Catalog status transition precondition violated
    InvalidStateTransition {
        tool_id: String,
        from: String,
        to: String,
    },
}

impl CheckoutError {
    /// True for errors that mean the core desynchronized internally.
    ///
    /// These should never occur when catalog and ledger are mutated only
    /// through the coordinator. They are logged and the operation aborted,
    /// never silently swallowed.
    pub fn is_invariant_breach(&self) -> bool {
        matches!(
            self,
            CheckoutError::DuplicateOpenCheckout { .. }
                | CheckoutError::AlreadyReturned { .. }
                | CheckoutError::InvalidStateTransition { .. }
        )
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::NotAuthenticated => {
                write!(f, "user must be logged in")
            }
            CheckoutError::AuthFailed => {
                write!(f, "invalid username or password")
            }
            CheckoutError::ToolNotFound { tool } => {
                write!(f, "no tool matching {}", tool)
            }
            CheckoutError::ToolUnavailable { tool_id, status } => {
                write!(f, "tool {} is not available (status: {})", tool_id, status)
            }
            CheckoutError::NotHolder { tool_id } => {
                write!(f, "tool {} is not checked out to this user", tool_id)
            }
            CheckoutError::NoOpenCheckout { tool_id } => {
                write!(f, "no open checkout record matching {}", tool_id)
            }
            CheckoutError::DuplicateOpenCheckout { tool_id } => {
                write!(f, "ledger already has an open checkout for tool {}", tool_id)
            }
            CheckoutError::AlreadyReturned { transaction_id } => {
                write!(f, "transaction {} was already returned", transaction_id)
            }
            CheckoutError::InvalidStateTransition { tool_id, from, to } => {
                write!(f, "tool {}: invalid transition {} -> {}", tool_id, from, to)
            }
        }
    }
}

impl std::error::Error for CheckoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breach_classification() {
        assert!(!CheckoutError::NotAuthenticated.is_invariant_breach());
        assert!(!CheckoutError::ToolNotFound {
            tool: "123".to_string()
        }
        .is_invariant_breach());
        assert!(!CheckoutError::NotHolder {
            tool_id: "TOOL001".to_string()
        }
        .is_invariant_breach());

        assert!(CheckoutError::DuplicateOpenCheckout {
            tool_id: "TOOL001".to_string()
        }
        .is_invariant_breach());
        assert!(CheckoutError::AlreadyReturned {
            transaction_id: "abc".to_string()
        }
        .is_invariant_breach());
        assert!(CheckoutError::InvalidStateTransition {
            tool_id: "TOOL001".to_string(),
            from: "checked_out".to_string(),
            to: "checked_out".to_string(),
        }
        .is_invariant_breach());
    }

    #[test]
    fn test_display_messages() {
        let err = CheckoutError::ToolUnavailable {
            tool_id: "TOOL002".to_string(),
            status: "maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tool TOOL002 is not available (status: maintenance)"
        );

        let err = CheckoutError::AuthFailed;
        assert_eq!(err.to_string(), "invalid username or password");
    }
}

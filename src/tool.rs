// 🔧 Tool Entity & Catalog - Who holds what, right now
// The catalog is the current-state view: one entry per physical tool,
// status and holder mutated only through the checkout coordinator.
// History lives in the transaction ledger, not here.

use crate::error::CheckoutError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

// ============================================================================
// TOOL STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolStatus {
    /// On the shelf, can be checked out
    Available,

    /// In someone's hands (checked_out_to holds who)
    CheckedOut,

    /// Pulled from circulation for repair
    Maintenance,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Available => "available",
            ToolStatus::CheckedOut => "checked_out",
            ToolStatus::Maintenance => "maintenance",
        }
    }

    /// Parse the storage representation ("available", "checked_out", ...)
    pub fn parse(s: &str) -> Option<ToolStatus> {
        match s {
            "available" => Some(ToolStatus::Available),
            "checked_out" => Some(ToolStatus::CheckedOut),
            "maintenance" => Some(ToolStatus::Maintenance),
            _ => None,
        }
    }
}

// ============================================================================
// TOOL CONDITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolCondition {
    Good,
    Damaged,
    Broken,
}

impl ToolCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCondition::Good => "good",
            ToolCondition::Damaged => "damaged",
            ToolCondition::Broken => "broken",
        }
    }

    pub fn parse(s: &str) -> Option<ToolCondition> {
        match s {
            "good" => Some(ToolCondition::Good),
            "damaged" => Some(ToolCondition::Damaged),
            "broken" => Some(ToolCondition::Broken),
            _ => None,
        }
    }
}

// ============================================================================
// TOOL ENTITY
// ============================================================================

/// One physical tool.
///
/// Invariant: `checked_out_to` is `Some` exactly when `status` is
/// `CheckedOut`. Both fields change together, only via the catalog's
/// `mark_*` operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Stable identity (e.g. "TOOL001")
    pub tool_id: String,

    /// Scan code on the physical label
    pub barcode: String,

    pub name: String,

    /// Like "Hand Tools" or "Power Tools"
    pub category: String,

    pub status: ToolStatus,

    pub condition: ToolCondition,

    /// Employee ID of the current holder
    pub checked_out_to: Option<String>,
}

impl Tool {
    /// New tool, available and in good condition
    pub fn new(tool_id: &str, name: &str, barcode: &str, category: &str) -> Self {
        Tool {
            tool_id: tool_id.to_string(),
            barcode: barcode.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            status: ToolStatus::Available,
            condition: ToolCondition::Good,
            checked_out_to: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ToolStatus::Available
    }

    /// Holder/status pairing holds (see struct invariant)
    pub fn is_consistent(&self) -> bool {
        self.checked_out_to.is_some() == (self.status == ToolStatus::CheckedOut)
    }
}

// ============================================================================
// TOOL CATALOG
// ============================================================================

/// Registry of all tools, in catalog insertion order.
///
/// Shared mutable state: readers get cloned snapshots, writers take the
/// lock for the whole check-then-set so a stale status can never be
/// committed. Tools are never deleted during a session.
#[derive(Clone)]
pub struct ToolCatalog {
    tools: Arc<RwLock<Vec<Tool>>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        ToolCatalog {
            tools: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Build from an already-loaded tool list (see `store::load_tools`)
    pub fn from_tools(tools: Vec<Tool>) -> Self {
        ToolCatalog {
            tools: Arc::new(RwLock::new(tools)),
        }
    }

    pub fn add(&self, tool: Tool) {
        let mut tools = self.tools.write().unwrap();
        tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().unwrap().is_empty()
    }

    pub fn find_by_scan_code(&self, barcode: &str) -> Option<Tool> {
        let tools = self.tools.read().unwrap();
        tools.iter().find(|t| t.barcode == barcode).cloned()
    }

    pub fn get(&self, tool_id: &str) -> Option<Tool> {
        let tools = self.tools.read().unwrap();
        tools.iter().find(|t| t.tool_id == tool_id).cloned()
    }

    /// Tools with the given status, insertion order (stable)
    pub fn list_by_status(&self, status: ToolStatus) -> Vec<Tool> {
        let tools = self.tools.read().unwrap();
        tools.iter().filter(|t| t.status == status).cloned().collect()
    }

    /// Full catalog copy for presentation/report consumers
    pub fn snapshot(&self) -> Vec<Tool> {
        self.tools.read().unwrap().clone()
    }

    /// Counts per status: (available, checked_out, maintenance)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let tools = self.tools.read().unwrap();
        let mut counts = (0, 0, 0);
        for tool in tools.iter() {
            match tool.status {
                ToolStatus::Available => counts.0 += 1,
                ToolStatus::CheckedOut => counts.1 += 1,
                ToolStatus::Maintenance => counts.2 += 1,
            }
        }
        counts
    }

    /// Transition Available -> CheckedOut, recording the holder.
    ///
    /// The precondition is re-checked under the write lock; a tool that
    /// stopped being available since the caller looked fails here instead
    /// of being double-issued.
    pub fn mark_checked_out(
        &self,
        tool_id: &str,
        employee_id: &str,
    ) -> Result<(), CheckoutError> {
        let mut tools = self.tools.write().unwrap();
        let tool = tools
            .iter_mut()
            .find(|t| t.tool_id == tool_id)
            .ok_or_else(|| CheckoutError::ToolNotFound {
                tool: tool_id.to_string(),
            })?;

        if tool.status != ToolStatus::Available {
            return Err(CheckoutError::InvalidStateTransition {
                tool_id: tool.tool_id.clone(),
                from: tool.status.as_str().to_string(),
                to: ToolStatus::CheckedOut.as_str().to_string(),
            });
        }

        tool.status = ToolStatus::CheckedOut;
        tool.checked_out_to = Some(employee_id.to_string());
        Ok(())
    }

    /// Transition CheckedOut -> Available, clearing the holder and
    /// recording the condition observed at return time.
    pub fn mark_available(
        &self,
        tool_id: &str,
        condition: ToolCondition,
    ) -> Result<(), CheckoutError> {
        let mut tools = self.tools.write().unwrap();
        let tool = tools
            .iter_mut()
            .find(|t| t.tool_id == tool_id)
            .ok_or_else(|| CheckoutError::ToolNotFound {
                tool: tool_id.to_string(),
            })?;

        if tool.status != ToolStatus::CheckedOut {
            return Err(CheckoutError::InvalidStateTransition {
                tool_id: tool.tool_id.clone(),
                from: tool.status.as_str().to_string(),
                to: ToolStatus::Available.as_str().to_string(),
            });
        }

        tool.status = ToolStatus::Available;
        tool.checked_out_to = None;
        tool.condition = condition;
        Ok(())
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

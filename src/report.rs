// 📊 Reports - Pull-based views over ledger and catalog
// Reports are plain data built from the coordinator's read-only queries;
// rendering returns a String so any surface (CLI, web, file) can present
// it. Report ids are UUIDs.

use crate::tool::{Tool, ToolStatus};
use crate::transaction::TransactionRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

fn new_report_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// CHECKOUT ACTIVITY REPORT
// ============================================================================

/// Ledger-wide checkout/return activity.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutActivityReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,

    /// Every record began life as a checkout
    pub total_checkouts: usize,

    /// Closed records (return processed)
    pub total_returns: usize,

    /// Open records (tools still in someone's hands)
    pub currently_out: usize,

    pub records: Vec<TransactionRecord>,
}

impl CheckoutActivityReport {
    pub fn build(records: Vec<TransactionRecord>) -> Self {
        let total_checkouts = records.len();
        let total_returns = records.iter().filter(|r| !r.is_open()).count();

        CheckoutActivityReport {
            report_id: new_report_id(),
            generated_at: Utc::now(),
            total_checkouts,
            total_returns,
            currently_out: total_checkouts - total_returns,
            records,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Checkout Report ===\n");
        out.push_str(&format!("Report ID: {}\n", self.report_id));
        out.push_str(&format!("Generated: {}\n", self.generated_at.to_rfc3339()));
        out.push_str(&"-".repeat(50));
        out.push('\n');

        if self.records.is_empty() {
            out.push_str("No transactions found\n");
            return out;
        }

        for record in &self.records {
            let status = if record.is_open() { "CHECKED OUT" } else { "RETURNED" };
            out.push_str(&format!(
                "Employee: {} | Tool: {} | Date: {} | Status: {}\n",
                record.employee_id,
                record.tool_id,
                record.checkout_time.to_rfc3339(),
                status
            ));
        }

        out.push_str(&"-".repeat(50));
        out.push('\n');
        out.push_str(&format!("Total Checkouts: {}\n", self.total_checkouts));
        out.push_str(&format!("Total Returns: {}\n", self.total_returns));
        out.push_str(&format!("Currently Out: {}\n", self.currently_out));
        out
    }
}

// ============================================================================
// TOOL STATUS REPORT
// ============================================================================

/// Catalog snapshot grouped by status.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatusReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub available: usize,
    pub checked_out: usize,
    pub maintenance: usize,
    pub tools: Vec<Tool>,
}

impl ToolStatusReport {
    pub fn build(tools: Vec<Tool>) -> Self {
        let available = tools.iter().filter(|t| t.status == ToolStatus::Available).count();
        let checked_out = tools.iter().filter(|t| t.status == ToolStatus::CheckedOut).count();
        let maintenance = tools.iter().filter(|t| t.status == ToolStatus::Maintenance).count();

        ToolStatusReport {
            report_id: new_report_id(),
            generated_at: Utc::now(),
            available,
            checked_out,
            maintenance,
            tools,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Tool Status Report ===\n");
        out.push_str(&format!("Report ID: {}\n", self.report_id));
        out.push_str(&format!("Generated: {}\n", self.generated_at.to_rfc3339()));
        out.push_str(&"-".repeat(60));
        out.push('\n');

        if self.tools.is_empty() {
            out.push_str("No tools found\n");
            return out;
        }

        for tool in &self.tools {
            let holder = match &tool.checked_out_to {
                Some(employee_id) => format!(" (to {})", employee_id),
                None => String::new(),
            };
            out.push_str(&format!(
                "ID: {} | Name: {} | Status: {} | Condition: {}{}\n",
                tool.tool_id,
                tool.name,
                tool.status.as_str().to_uppercase(),
                tool.condition.as_str(),
                holder
            ));
        }

        out.push_str(&"-".repeat(60));
        out.push('\n');
        out.push_str(&format!(
            "Available: {} | Checked Out: {} | Maintenance: {}\n",
            self.available, self.checked_out, self.maintenance
        ));
        out
    }
}

// ============================================================================
// EMPLOYEE USAGE REPORT
// ============================================================================

/// One employee's checkout history.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeUsageReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub employee_id: String,
    pub records: Vec<TransactionRecord>,
}

impl EmployeeUsageReport {
    /// Build from a `history_for` result (already filtered to one user)
    pub fn build(employee_id: &str, records: Vec<TransactionRecord>) -> Self {
        EmployeeUsageReport {
            report_id: new_report_id(),
            generated_at: Utc::now(),
            employee_id: employee_id.to_string(),
            records,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Employee Usage Report - {} ===\n", self.employee_id));
        out.push_str(&format!("Report ID: {}\n", self.report_id));
        out.push_str(&format!("Generated: {}\n", self.generated_at.to_rfc3339()));
        out.push_str(&"-".repeat(50));
        out.push('\n');

        if self.records.is_empty() {
            out.push_str(&format!(
                "No transactions found for employee {}\n",
                self.employee_id
            ));
            return out;
        }

        for record in &self.records {
            let status = if record.is_open() { "STILL OUT" } else { "RETURNED" };
            out.push_str(&format!(
                "Tool: {} | Checkout: {} | Status: {}\n",
                record.tool_id,
                record.checkout_time.to_rfc3339(),
                status
            ));
            if let Some(notes) = &record.notes {
                out.push_str(&format!("  Notes: {}\n", notes));
            }
        }

        out.push_str(&"-".repeat(50));
        out.push('\n');
        out.push_str(&format!("Total transactions: {}\n", self.records.len()));
        out
    }
}

// ============================================================================
// EXPORT
// ============================================================================

/// Write any report as pretty-printed JSON.
pub fn export_json<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

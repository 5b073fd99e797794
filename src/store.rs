// 🗄️ Store Adapters - SQLite boundary for catalog load and credentials
// The core never owns the storage format. This module maps the employees
// and tools tables (and optionally a CSV export) into core types, and
// implements the Authenticator trait over the credential table.
//
// Secrets are stored as SHA-256 digests, never plaintext.

use crate::error::CheckoutError;
use crate::session::{Authenticator, Employee};
use crate::tool::{Tool, ToolCondition, ToolStatus};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 hex digest of a login secret
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS employees (
            employee_id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            skill_level TEXT,
            department TEXT,
            is_active BOOLEAN DEFAULT 1,
            created_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tools (
            tool_id TEXT PRIMARY KEY,
            barcode TEXT UNIQUE NOT NULL,
            tool_name TEXT NOT NULL,
            category TEXT,
            status TEXT DEFAULT 'available',
            condition_status TEXT DEFAULT 'good',
            checked_out_to TEXT,
            created_date TEXT
        )",
        [],
    )?;

    Ok(())
}

/// Insert the demo employees and tools (idempotent).
///
/// Same fixture set the original deployment shipped with; passwords land
/// as digests only.
pub fn seed_sample_data(conn: &Connection) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();

    let employees = [
        ("EMP001", "employee1", "password123", "John Smith", "Level 2", "Maintenance"),
        ("EMP002", "employee2", "password456", "Jane Doe", "Level 3", "Maintenance"),
        ("MGR001", "manager1", "manager123", "Bob Johnson", "Manager", "Management"),
    ];

    for (id, username, password, name, skill, department) in employees {
        conn.execute(
            "INSERT OR REPLACE INTO employees
             (employee_id, username, password_hash, name, skill_level, department, is_active, created_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
            params![id, username, hash_secret(password), name, skill, department, now],
        )?;
    }

    let tools = [
        ("TOOL001", "123456789", "Hammer", "Hand Tools"),
        ("TOOL002", "987654321", "Power Drill", "Power Tools"),
        ("TOOL003", "456789123", "Screwdriver Set", "Hand Tools"),
        ("TOOL004", "789123456", "Socket Wrench", "Hand Tools"),
    ];

    for (id, barcode, name, category) in tools {
        conn.execute(
            "INSERT OR REPLACE INTO tools
             (tool_id, barcode, tool_name, category, status, condition_status, checked_out_to, created_date)
             VALUES (?1, ?2, ?3, ?4, 'available', 'good', NULL, ?5)",
            params![id, barcode, name, category, now],
        )?;
    }

    Ok(())
}

// ============================================================================
// CATALOG LOAD
// ============================================================================

/// Load the full tool catalog from the tools table.
///
/// A row with an unknown status or condition is a data fault and fails the
/// load; it is not silently skipped.
pub fn load_tools(conn: &Connection) -> Result<Vec<Tool>> {
    let mut stmt = conn
        .prepare(
            "SELECT tool_id, tool_name, barcode, category, status, condition_status, checked_out_to
             FROM tools
             ORDER BY tool_id",
        )
        .context("tools table missing - run setup first")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tools = Vec::new();
    for (tool_id, name, barcode, category, status, condition, checked_out_to) in rows {
        let status = ToolStatus::parse(&status)
            .ok_or_else(|| anyhow!("tool {}: unknown status '{}'", tool_id, status))?;
        let condition = ToolCondition::parse(&condition)
            .ok_or_else(|| anyhow!("tool {}: unknown condition '{}'", tool_id, condition))?;

        tools.push(Tool {
            tool_id,
            barcode,
            name,
            category: category.unwrap_or_default(),
            status,
            condition,
            checked_out_to,
        });
    }

    Ok(tools)
}

/// Row shape for CSV catalog imports
#[derive(Debug, Deserialize)]
struct CsvToolRow {
    #[serde(rename = "Tool_ID")]
    tool_id: String,

    #[serde(rename = "Barcode")]
    barcode: String,

    #[serde(rename = "Tool_Name")]
    name: String,

    #[serde(rename = "Category")]
    category: String,
}

/// Load new tools from a CSV export. Imported tools start available and
/// in good condition.
pub fn load_tools_csv(csv_path: &Path) -> Result<Vec<Tool>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open catalog CSV")?;

    let mut tools = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvToolRow = result.context("Failed to deserialize catalog row")?;
        tools.push(Tool::new(&row.tool_id, &row.name, &row.barcode, &row.category));
    }

    Ok(tools)
}

// ============================================================================
// CREDENTIAL LOOKUP
// ============================================================================

/// Authenticator over the employees table.
pub struct SqliteAuthenticator {
    conn: Connection,
}

impl SqliteAuthenticator {
    pub fn new(conn: Connection) -> Self {
        SqliteAuthenticator { conn }
    }

    /// Row lookup with full error fidelity; the trait impl folds the
    /// outcome into the binary authenticate contract.
    fn lookup(&self, username: &str, digest: &str) -> Result<Option<Employee>> {
        self.conn
            .query_row(
                "SELECT employee_id, username, name, skill_level, department
                 FROM employees
                 WHERE username = ?1 AND password_hash = ?2 AND is_active = 1",
                params![username, digest],
                |row| {
                    Ok(Employee {
                        employee_id: row.get(0)?,
                        username: row.get(1)?,
                        name: row.get(2)?,
                        skill_level: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        department: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        is_active: true,
                        is_logged_in: false,
                    })
                },
            )
            .optional()
            .context("credential lookup failed")
    }
}

impl Authenticator for SqliteAuthenticator {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Employee, CheckoutError> {
        match self.lookup(username, &hash_secret(secret)) {
            Ok(Some(employee)) => Ok(employee),
            Ok(None) => Err(CheckoutError::AuthFailed),
            Err(e) => {
                // Storage fault, not a bad password - say so before
                // rejecting the login
                eprintln!("credential store error: {:#}", e);
                Err(CheckoutError::AuthFailed)
            }
        }
    }
}

// 🔄 Checkout Coordinator - The checkout/return state machine
// Orchestrates session, catalog and ledger:
//
//   available --checkout(user)--> checked_out(holder=user)
//   checked_out(holder=user) --return(user, condition)--> available
//
// All user-facing rejections happen before any mutation, so a failed
// operation leaves catalog and ledger exactly as they were. On success the
// ledger is written BEFORE the catalog mutates - an audit record must
// exist before visible state changes.

use crate::error::CheckoutError;
use crate::session::Session;
use crate::tool::{Tool, ToolCatalog, ToolCondition, ToolStatus};
use crate::transaction::{TransactionLedger, TransactionRecord};
use std::sync::Mutex;

/// Coordinator over one catalog and one ledger.
///
/// Checkout and return are check-then-set sequences over shared state, so
/// the coordinator serializes them behind `op_lock`. The registries guard
/// themselves with their own locks as well; the ledger's duplicate-open
/// check and the catalog's status precondition both hold independently.
pub struct CheckoutSystem {
    catalog: ToolCatalog,
    ledger: TransactionLedger,
    op_lock: Mutex<()>,
}

impl CheckoutSystem {
    pub fn new(catalog: ToolCatalog) -> Self {
        CheckoutSystem {
            catalog,
            ledger: TransactionLedger::new(),
            op_lock: Mutex::new(()),
        }
    }

    /// Check a tool out to the session's user.
    ///
    /// Returns the new transaction record id. Rejections in order:
    /// NotAuthenticated, ToolNotFound, ToolUnavailable. Invariant
    /// breaches (ledger/catalog desync) abort loudly.
    pub fn checkout(&self, session: &Session, barcode: &str) -> Result<String, CheckoutError> {
        let user = session.authenticated_user()?;
        let employee_id = user.employee_id.clone();

        let _guard = self.op_lock.lock().unwrap();

        let tool = self.catalog.find_by_scan_code(barcode).ok_or_else(|| {
            CheckoutError::ToolNotFound {
                tool: barcode.to_string(),
            }
        })?;

        if tool.status != ToolStatus::Available {
            return Err(CheckoutError::ToolUnavailable {
                tool_id: tool.tool_id.clone(),
                status: tool.status.as_str().to_string(),
            });
        }

        // Ledger first: the audit record exists before the catalog moves
        let record = self
            .ledger
            .record_checkout(&tool.tool_id, &employee_id)
            .map_err(|e| self.report_breach(e))?;

        self.catalog
            .mark_checked_out(&tool.tool_id, &employee_id)
            .map_err(|e| self.report_breach(e))?;

        Ok(record.id)
    }

    /// Return a tool held by the session's user.
    ///
    /// Rejections in order: NotAuthenticated, ToolNotFound, NotHolder,
    /// NoOpenCheckout. On success the ledger record is closed with the
    /// supplied condition and notes, then the catalog goes back to
    /// available.
    pub fn return_tool(
        &self,
        session: &Session,
        barcode: &str,
        condition: ToolCondition,
        notes: &str,
    ) -> Result<(), CheckoutError> {
        let user = session.authenticated_user()?;
        let employee_id = user.employee_id.clone();

        let _guard = self.op_lock.lock().unwrap();

        let tool = self.catalog.find_by_scan_code(barcode).ok_or_else(|| {
            CheckoutError::ToolNotFound {
                tool: barcode.to_string(),
            }
        })?;

        if tool.checked_out_to.as_deref() != Some(employee_id.as_str()) {
            return Err(CheckoutError::NotHolder {
                tool_id: tool.tool_id.clone(),
            });
        }

        // Defensive: the catalog says this user holds the tool, but the
        // ledger is the source of truth and must agree
        let record = self
            .ledger
            .find_open_checkout(&tool.tool_id, &employee_id)
            .ok_or_else(|| {
                self.report_breach(CheckoutError::NoOpenCheckout {
                    tool_id: tool.tool_id.clone(),
                })
            })?;

        self.ledger
            .record_return(&record.id, condition, notes)
            .map_err(|e| self.report_breach(e))?;

        self.catalog
            .mark_available(&tool.tool_id, condition)
            .map_err(|e| self.report_breach(e))?;

        Ok(())
    }

    /// Log breaches to stderr on the way out; expected rejections pass
    /// through untouched.
    fn report_breach(&self, err: CheckoutError) -> CheckoutError {
        if err.is_invariant_breach() {
            eprintln!("INVARIANT BREACH (operation aborted): {}", err);
        }
        err
    }

    // ========================================================================
    // READ-ONLY QUERIES (presentation layers pull, the core never pushes)
    // ========================================================================

    pub fn available_tools(&self) -> Vec<Tool> {
        self.catalog.list_by_status(ToolStatus::Available)
    }

    pub fn tools_by_status(&self, status: ToolStatus) -> Vec<Tool> {
        self.catalog.list_by_status(status)
    }

    pub fn catalog_snapshot(&self) -> Vec<Tool> {
        self.catalog.snapshot()
    }

    pub fn history_for(&self, employee_id: &str) -> Vec<TransactionRecord> {
        self.ledger.history_for(employee_id)
    }

    pub fn all_transactions(&self) -> Vec<TransactionRecord> {
        self.ledger.all_records()
    }

    pub fn open_transactions(&self) -> Vec<TransactionRecord> {
        self.ledger.open_records()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Authenticator, Employee};
    use crate::transaction::TransactionKind;
    use rand::Rng;

    fn create_test_employee(id: &str, name: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            username: name.to_lowercase().replace(' ', ""),
            name: name.to_string(),
            skill_level: "Level 2".to_string(),
            department: "Maintenance".to_string(),
            is_active: true,
            is_logged_in: false,
        }
    }

    /// Authenticator that accepts any username and mints an identity
    struct OpenDoorAuthenticator;

    impl Authenticator for OpenDoorAuthenticator {
        fn authenticate(
            &self,
            username: &str,
            _secret: &str,
        ) -> Result<Employee, CheckoutError> {
            let id = match username {
                "employee1" => "EMP001",
                "employee2" => "EMP002",
                _ => return Err(CheckoutError::AuthFailed),
            };
            Ok(create_test_employee(id, username))
        }
    }

    fn logged_in(username: &str) -> Session {
        let mut session = Session::new();
        session
            .login(&OpenDoorAuthenticator, username, "x")
            .unwrap();
        session
    }

    fn create_test_system() -> CheckoutSystem {
        CheckoutSystem::new(ToolCatalog::from_tools(vec![
            Tool::new("TOOL001", "Hammer", "123456789", "Hand Tools"),
            Tool::new("TOOL002", "Power Drill", "987654321", "Power Tools"),
            Tool::new("TOOL003", "Screwdriver Set", "456789123", "Hand Tools"),
        ]))
    }

    #[test]
    fn test_checkout_requires_login() {
        let system = create_test_system();
        let session = Session::new();

        let err = system.checkout(&session, "123456789").unwrap_err();
        assert_eq!(err, CheckoutError::NotAuthenticated);
        assert!(system.all_transactions().is_empty());
    }

    #[test]
    fn test_checkout_unknown_barcode() {
        let system = create_test_system();
        let session = logged_in("employee1");

        let err = system.checkout(&session, "000000000").unwrap_err();
        assert!(matches!(err, CheckoutError::ToolNotFound { .. }));
    }

    #[test]
    fn test_checkout_then_return_round_trip() {
        let system = create_test_system();
        let session = logged_in("employee1");

        // Checkout: status flips, holder recorded, ledger has open record
        let record_id = system.checkout(&session, "123456789").unwrap();
        let tool = system.catalog().get("TOOL001").unwrap();
        assert_eq!(tool.status, ToolStatus::CheckedOut);
        assert_eq!(tool.checked_out_to.as_deref(), Some("EMP001"));

        // Return with damage: available again, condition recorded,
        // exactly one record and it is closed
        system
            .return_tool(&session, "123456789", ToolCondition::Damaged, "")
            .unwrap();

        let tool = system.catalog().get("TOOL001").unwrap();
        assert_eq!(tool.status, ToolStatus::Available);
        assert_eq!(tool.condition, ToolCondition::Damaged);
        assert!(tool.checked_out_to.is_none());

        let records = system.all_transactions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id);
        assert_eq!(records[0].kind, TransactionKind::Return);
        assert!(records[0].return_time.is_some());
    }

    #[test]
    fn test_checkout_maintenance_tool_rejected() {
        let mut wrench = Tool::new("TOOL004", "Socket Wrench", "789123456", "Hand Tools");
        wrench.status = ToolStatus::Maintenance;
        let system = CheckoutSystem::new(ToolCatalog::from_tools(vec![wrench]));
        let session = logged_in("employee1");

        let err = system.checkout(&session, "789123456").unwrap_err();
        assert_eq!(
            err,
            CheckoutError::ToolUnavailable {
                tool_id: "TOOL004".to_string(),
                status: "maintenance".to_string(),
            }
        );
        assert!(system.all_transactions().is_empty());
    }

    #[test]
    fn test_double_checkout_rejected() {
        let system = create_test_system();
        let alice = logged_in("employee1");
        let bob = logged_in("employee2");

        system.checkout(&alice, "123456789").unwrap();

        let err = system.checkout(&bob, "123456789").unwrap_err();
        assert!(matches!(err, CheckoutError::ToolUnavailable { .. }));
        assert!(!err.is_invariant_breach());

        // Still exactly one ledger record, still held by the first user
        assert_eq!(system.all_transactions().len(), 1);
        let tool = system.catalog().get("TOOL001").unwrap();
        assert_eq!(tool.checked_out_to.as_deref(), Some("EMP001"));
    }

    #[test]
    fn test_return_by_non_holder_mutates_nothing() {
        let system = create_test_system();
        let alice = logged_in("employee1");
        let bob = logged_in("employee2");

        system.checkout(&alice, "123456789").unwrap();
        let before_catalog = system.catalog_snapshot();
        let before_ledger = system.all_transactions();

        let err = system
            .return_tool(&bob, "123456789", ToolCondition::Good, "")
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotHolder { .. }));

        // No partial mutation on failure
        let after_catalog = system.catalog_snapshot();
        let after_ledger = system.all_transactions();
        assert_eq!(before_catalog.len(), after_catalog.len());
        for (before, after) in before_catalog.iter().zip(after_catalog.iter()) {
            assert_eq!(before.status, after.status);
            assert_eq!(before.checked_out_to, after.checked_out_to);
            assert_eq!(before.condition, after.condition);
        }
        assert_eq!(before_ledger.len(), after_ledger.len());
        assert!(after_ledger[0].is_open());
    }

    #[test]
    fn test_return_without_checkout_is_not_holder() {
        let system = create_test_system();
        let session = logged_in("employee1");

        let err = system
            .return_tool(&session, "123456789", ToolCondition::Good, "")
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotHolder { .. }));
    }

    #[test]
    fn test_desynced_catalog_surfaces_no_open_checkout() {
        // Force the state the ledger should never see: catalog says
        // checked out, ledger has no record of it
        let system = create_test_system();
        system
            .catalog()
            .mark_checked_out("TOOL001", "EMP001")
            .unwrap();

        let session = logged_in("employee1");
        let err = system
            .return_tool(&session, "123456789", ToolCondition::Good, "")
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NoOpenCheckout { .. }));

        // Aborted: catalog untouched by the failed return
        let tool = system.catalog().get("TOOL001").unwrap();
        assert_eq!(tool.status, ToolStatus::CheckedOut);
    }

    #[test]
    fn test_history_counts_after_mixed_operations() {
        let system = create_test_system();
        let session = logged_in("employee1");

        // N = 3 checkouts, M = 2 returns for EMP001
        system.checkout(&session, "123456789").unwrap();
        system.checkout(&session, "987654321").unwrap();
        system.checkout(&session, "456789123").unwrap();
        system
            .return_tool(&session, "123456789", ToolCondition::Good, "")
            .unwrap();
        system
            .return_tool(&session, "456789123", ToolCondition::Broken, "motor seized")
            .unwrap();

        let history = system.history_for("EMP001");
        assert_eq!(history.len(), 3);
        let closed = history.iter().filter(|r| !r.is_open()).count();
        assert_eq!(closed, 2);

        // Insertion order: checkout order, not return order
        assert_eq!(history[0].tool_id, "TOOL001");
        assert_eq!(history[1].tool_id, "TOOL002");
        assert_eq!(history[2].tool_id, "TOOL003");
    }

    #[test]
    fn test_available_tools_shrinks_and_grows() {
        let system = create_test_system();
        let session = logged_in("employee1");

        assert_eq!(system.available_tools().len(), 3);
        system.checkout(&session, "987654321").unwrap();
        assert_eq!(system.available_tools().len(), 2);
        system
            .return_tool(&session, "987654321", ToolCondition::Good, "")
            .unwrap();
        assert_eq!(system.available_tools().len(), 3);
    }

    #[test]
    fn test_invariant_holds_under_random_operations() {
        let system = create_test_system();
        let sessions = [logged_in("employee1"), logged_in("employee2")];
        let barcodes = ["123456789", "987654321", "456789123"];
        let mut rng = rand::rng();

        for _ in 0..500 {
            let session = &sessions[rng.random_range(0..sessions.len())];
            let barcode = barcodes[rng.random_range(0..barcodes.len())];

            // Outcomes vary; what must never vary is the state pairing
            let result = if rng.random_bool(0.5) {
                system.checkout(session, barcode).map(|_| ())
            } else {
                system
                    .return_tool(session, barcode, ToolCondition::Good, "")
                    .map(|_| ())
            };

            if let Err(err) = result {
                assert!(
                    !err.is_invariant_breach(),
                    "random walk hit an invariant breach: {}",
                    err
                );
            }

            for tool in system.catalog_snapshot() {
                assert!(
                    tool.is_consistent(),
                    "tool {} has status {} with holder {:?}",
                    tool.tool_id,
                    tool.status.as_str(),
                    tool.checked_out_to
                );
            }

            // At most one open ledger record per tool
            let open = system.open_transactions();
            for barcode in &barcodes {
                let tool = system.catalog().find_by_scan_code(barcode).unwrap();
                let open_for_tool =
                    open.iter().filter(|r| r.tool_id == tool.tool_id).count();
                assert!(open_for_tool <= 1);

                // Open record exists exactly when the catalog says out
                let expected = if tool.status == ToolStatus::CheckedOut { 1 } else { 0 };
                assert_eq!(open_for_tool, expected);
            }
        }
    }
}

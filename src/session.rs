// 👤 Employee Identity & Session Context
// The session is an explicit per-request value handed to every coordinator
// call - there is no process-wide "current user". Credential storage lives
// behind the Authenticator trait; the core only ever compares employee ids.

use crate::error::CheckoutError;
use serde::{Deserialize, Serialize};

// ============================================================================
// EMPLOYEE
// ============================================================================

/// Authenticated user identity, as resolved by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Stable identity (e.g. "EMP001")
    pub employee_id: String,

    pub username: String,

    /// Display name
    pub name: String,

    /// Like "Level 2" or "Manager"
    pub skill_level: String,

    pub department: String,

    /// Deactivated accounts fail authentication
    pub is_active: bool,

    /// Set when this identity came through a successful login
    pub is_logged_in: bool,
}

impl Employee {
    pub fn profile(&self) -> String {
        format!("Employee: {}, ID: {}", self.name, self.employee_id)
    }
}

// ============================================================================
// AUTHENTICATOR (boundary trait)
// ============================================================================

/// Credential lookup the core consumes but does not implement.
///
/// Implementations resolve username + secret to an identity or reject with
/// `AuthFailed`. What "secret" means (digest scheme, storage) is the
/// implementation's concern; see `store::SqliteAuthenticator`.
pub trait Authenticator {
    fn authenticate(&self, username: &str, secret: &str) -> Result<Employee, CheckoutError>;
}

// ============================================================================
// SESSION
// ============================================================================

/// Per-request user context.
///
/// Starts anonymous; `login` swaps in the authenticated identity. Every
/// coordinator operation takes `&Session` and checks it - a logged-out
/// session fails with `NotAuthenticated`, never with a panic.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<Employee>,
}

impl Session {
    /// Fresh anonymous session
    pub fn new() -> Self {
        Session { current_user: None }
    }

    /// Resolve credentials through the authenticator and bind the
    /// resulting identity to this session.
    pub fn login(
        &mut self,
        authenticator: &dyn Authenticator,
        username: &str,
        secret: &str,
    ) -> Result<&Employee, CheckoutError> {
        let mut employee = authenticator.authenticate(username, secret)?;
        employee.is_logged_in = true;
        Ok(self.current_user.insert(employee))
    }

    /// Drop the identity; subsequent operations fail NotAuthenticated
    pub fn logout(&mut self) {
        self.current_user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user
            .as_ref()
            .map(|u| u.is_logged_in)
            .unwrap_or(false)
    }

    pub fn user(&self) -> Option<&Employee> {
        self.current_user.as_ref()
    }

    /// The authenticated identity, or NotAuthenticated
    pub fn authenticated_user(&self) -> Result<&Employee, CheckoutError> {
        match &self.current_user {
            Some(user) if user.is_logged_in => Ok(user),
            _ => Err(CheckoutError::NotAuthenticated),
        }
    }
}

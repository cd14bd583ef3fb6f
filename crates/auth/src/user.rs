//! Registered user accounts.

use skyportal_core::{DomainError, UserId};

use crate::Role;

/// A registered user account.
///
/// # Invariants
/// - `email` is normalized (trimmed, lowercased) and unique per store.
/// - The password exists only as an adaptive hash; plaintext never leaves the
///   registration/login handlers.
///
/// Deliberately not serializable: the hash must not ride along into response
/// bodies by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

impl UserAccount {
    /// Validate and normalize registration input into an account record.
    pub fn register(
        email: &str,
        display_name: &str,
        password_hash: String,
    ) -> Result<Self, DomainError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            display_name: display_name.to_string(),
            password_hash,
            roles: Vec::new(),
        })
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r.as_str() == role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_normalizes_email_and_name() {
        let account =
            UserAccount::register("  Alice@Example.COM ", "  Alice Smith ", "h".to_string())
                .unwrap();

        assert_eq!(account.email, "alice@example.com");
        assert_eq!(account.display_name, "Alice Smith");
        assert!(account.roles.is_empty());
    }

    #[test]
    fn register_rejects_invalid_email() {
        let result = UserAccount::register("not-an-email", "Alice", "h".to_string());
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = UserAccount::register("   ", "Alice", "h".to_string());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn register_rejects_empty_display_name() {
        let result = UserAccount::register("alice@example.com", "   ", "h".to_string());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn has_role_is_a_set_membership_test() {
        let mut account =
            UserAccount::register("alice@example.com", "Alice", "h".to_string()).unwrap();
        assert!(!account.has_role(&Role::ADMIN));

        account.roles.push(Role::ADMIN);
        assert!(account.has_role(&Role::ADMIN));
    }
}

use skyportal_auth::{Claims, Role};
use skyportal_core::UserId;

/// Resolved identity for a request.
///
/// Inserted as a request extension by the identity middleware; its absence
/// means the caller is anonymous. Handlers behind authenticated routes may
/// extract it directly — the policy layer guarantees it is present there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    email: String,
    roles: Vec<Role>,
}

impl AuthContext {
    pub fn new(user_id: UserId, email: String, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            email,
            roles,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

//! Identity of the shopper.
//!
//! Authentication lives outside Shopfront. Checkout only needs to know who,
//! if anyone, is signed in, to pre-fill the email field and attribute the
//! order.

use serde::{Deserialize, Serialize};
use shopfront_core::{Email, UserId};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID in the identity provider.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Source of the current user.
pub trait IdentityProvider {
    /// The signed-in user, or `None` for a guest.
    fn current_user(&self) -> Option<CurrentUser>;
}

/// Identity fixed at construction, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<CurrentUser>);

impl StaticIdentity {
    #[must_use]
    pub const fn new(user: Option<CurrentUser>) -> Self {
        Self(user)
    }

    /// A guest shopper.
    #[must_use]
    pub const fn guest() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<CurrentUser> {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let user = CurrentUser {
            id: UserId::new(3),
            email: Email::parse("ann@example.com").unwrap(),
        };
        assert_eq!(StaticIdentity::new(Some(user.clone())).current_user(), Some(user));
        assert_eq!(StaticIdentity::guest().current_user(), None);
    }
}

//! The two collaborating parties and the resolved caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of the collaboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The internal delivery team.
    Admin,
    /// The external client team.
    Client,
}

impl Party {
    /// Returns the other party.
    #[must_use]
    pub const fn counterparty(self) -> Self {
        match self {
            Self::Admin => Self::Client,
            Self::Client => Self::Admin,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Identity of the user making a request, as resolved by the
/// authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    /// Opaque user identifier.
    pub user_id: String,
    /// The party the user belongs to.
    pub party: Party,
    /// Client organisation of a client user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Caller {
    /// Creates an admin caller.
    #[must_use]
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            party: Party::Admin,
            client_id: None,
        }
    }

    /// Creates a client caller belonging to `client_id`.
    #[must_use]
    pub fn client(user_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            party: Party::Client,
            client_id: Some(client_id.into()),
        }
    }

    /// Returns true for admin callers.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.party == Party::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterparty() {
        assert_eq!(Party::Admin.counterparty(), Party::Client);
        assert_eq!(Party::Client.counterparty(), Party::Admin);
    }

    #[test]
    fn test_caller_constructors() {
        let admin = Caller::admin("u-1");
        assert!(admin.is_admin());
        assert!(admin.client_id.is_none());

        let client = Caller::client("u-2", "acme");
        assert!(!client.is_admin());
        assert_eq!(client.client_id.as_deref(), Some("acme"));
    }

    #[test]
    fn test_party_serialize() {
        assert_eq!(serde_json::to_string(&Party::Client).unwrap(), r#""client""#);
        assert_eq!(Party::Admin.to_string(), "admin");
    }
}

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::users;

/// Closed set of site roles. Unknown role strings are rejected when loading
/// from the database, so every `Role` value in the program is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Operator,
    Administrator,
    Developer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Operator => "operator",
            Self::Administrator => "administrator",
            Self::Developer => "developer",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "member" => Some(Self::Member),
            "operator" => Some(Self::Operator),
            "administrator" => Some(Self::Administrator),
            "developer" => Some(Self::Developer),
            _ => None,
        }
    }

    /// Content and logo edits are restricted to the two staff roles.
    #[must_use]
    pub const fn can_manage_content(self) -> bool {
        matches!(self, Self::Administrator | Self::Developer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-phase account status. An unverified account carries its verification
/// code; a verified one carries the promotion timestamp. Once verified, any
/// leftover code column value is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    Unverified { code: String },
    Verified { verified_at: String },
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub handle: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: String,
}

impl Account {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self.status, AccountStatus::Verified { .. })
    }
}

impl TryFrom<users::Model> for Account {
    type Error = anyhow::Error;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let Some(role) = Role::parse(&model.role) else {
            bail!("unknown role '{}' on account {}", model.role, model.id);
        };

        let status = match (model.is_verified, model.verification_code, model.verified_at) {
            (true, _, Some(verified_at)) => AccountStatus::Verified { verified_at },
            (true, _, None) => bail!("account {} is verified but has no timestamp", model.id),
            (false, Some(code), _) => AccountStatus::Unverified { code },
            (false, None, _) => bail!("account {} is unverified but has no code", model.id),
        };

        Ok(Self {
            id: model.id,
            handle: model.handle,
            role,
            status,
            created_at: model.created_at,
        })
    }
}

/// What a login binds into the session store. The session identifier presented
/// by the client is the only credential after this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAccount {
    pub account_id: i32,
    pub handle: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(is_verified: bool, code: Option<&str>, verified_at: Option<&str>) -> users::Model {
        users::Model {
            id: 1,
            handle: "Kael".to_string(),
            password_hash: "x".to_string(),
            role: "member".to_string(),
            is_verified,
            verification_code: code.map(str::to_string),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            verified_at: verified_at.map(str::to_string),
        }
    }

    #[test]
    fn role_round_trip() {
        for role in [
            Role::Member,
            Role::Operator,
            Role::Administrator,
            Role::Developer,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("usuario"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn content_management_roles() {
        assert!(!Role::Member.can_manage_content());
        assert!(!Role::Operator.can_manage_content());
        assert!(Role::Administrator.can_manage_content());
        assert!(Role::Developer.can_manage_content());
    }

    #[test]
    fn unverified_account_carries_code() {
        let account = Account::try_from(model(false, Some("RH00042"), None)).unwrap();
        assert!(!account.is_verified());
        assert_eq!(
            account.status,
            AccountStatus::Unverified {
                code: "RH00042".to_string()
            }
        );
    }

    #[test]
    fn verified_account_retires_code() {
        let account =
            Account::try_from(model(true, Some("RH00042"), Some("2026-01-02T00:00:00Z"))).unwrap();
        assert!(account.is_verified());
        assert!(matches!(account.status, AccountStatus::Verified { .. }));
    }

    #[test]
    fn illegal_states_rejected() {
        assert!(Account::try_from(model(true, None, None)).is_err());
        assert!(Account::try_from(model(false, None, None)).is_err());
    }

    #[test]
    fn unknown_role_rejected() {
        let mut m = model(false, Some("RH00042"), None);
        m.role = "sysop".to_string();
        assert!(Account::try_from(m).is_err());
    }
}

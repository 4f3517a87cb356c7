//! Role-based authorization gate.
//!
//! Returns a plain verdict; callers translate `Deny` into a response that
//! reveals nothing beyond "insufficient permission".

use crate::models::account::SessionAccount;

/// Actions the gate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Content and logo edits.
    ManageContent,
    /// Anything that just needs a verified, logged-in account.
    MemberArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

#[must_use]
pub fn authorize(session: Option<&SessionAccount>, action: Action) -> Verdict {
    let Some(session) = session else {
        return Verdict::Deny;
    };

    match action {
        Action::ManageContent => {
            if session.role.can_manage_content() {
                Verdict::Allow
            } else {
                Verdict::Deny
            }
        }
        Action::MemberArea => Verdict::Allow,
    }
}

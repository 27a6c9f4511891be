//! Role hierarchy resolution for repository role grants.
//!
//! [`resolve`] is pure: it reads a [`RepositoryRoleState`] snapshot and
//! returns a [`Decision`]. Persisting the resulting [`RoleMutation`] is up to
//! the caller, see `RealRoleService`.

use crate::domain_model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyKind {
    /// Caller holds no role in the repository.
    Unauthorized,
    /// Caller's rank does not permit the grant.
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        caller_role: Role,
        target_role: Role,
        mutation: RoleMutation,
    },
    Denied {
        kind: DenyKind,
        message: String,
    },
}

impl Decision {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    fn forbidden(message: String) -> Self {
        Decision::Denied {
            kind: DenyKind::Forbidden,
            message,
        }
    }
}

/// Decides whether `caller` may give `target` the `requested` role.
///
/// A caller may only grant roles strictly below their own rank, and may only
/// change the role of users strictly below them. Re-granting a role the
/// target already holds is denied rather than treated as a no-op. Self-grants
/// are not special-cased.
pub fn resolve(
    state: &RepositoryRoleState,
    caller: UserId,
    target: UserId,
    requested: AssignableRole,
) -> Decision {
    let caller_role = state.role_of(caller);
    let target_role = state.role_of(target);

    if caller_role == Role::None {
        return Decision::Denied {
            kind: DenyKind::Unauthorized,
            message: "You do not have permission to access this repository".to_string(),
        };
    }

    if !caller_role.outranks(requested.role()) {
        return Decision::forbidden(format!(
            "As a {caller_role}, you cannot assign the {requested} role"
        ));
    }

    if target_role != Role::None && !caller_role.outranks(target_role) {
        return Decision::forbidden(format!(
            "As a {caller_role}, you cannot modify a {target_role}'s role"
        ));
    }

    if target_role == requested.role() {
        return Decision::forbidden(format!("User already holds the {requested} role"));
    }

    // unreachable with the rank checks above, kept as an explicit rule
    if target_role == Role::Owner {
        return Decision::forbidden("Cannot modify the role of the repository owner".to_string());
    }

    Decision::Allowed {
        caller_role,
        target_role,
        mutation: RoleMutation {
            target,
            remove_from: AssignableRole::try_from(target_role).ok(),
            add_to: requested,
        },
    }
}

use crate::domain_model::{AssignableRole, Role, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleStateError {
    #[error("owner {0} is also listed as a member")]
    OwnerListed(UserId),
    #[error("user {0} holds more than one role")]
    MultipleRoles(UserId),
    #[error("mutation for {0} does not match their current role")]
    StaleMutation(UserId),
}

/// Role assignments of one repository.
///
/// The owner never appears in a member set and the three member sets are
/// pairwise disjoint, so every user resolves to exactly one [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRoleState {
    owner_id: UserId,
    admins: BTreeSet<UserId>,
    collaborators: BTreeSet<UserId>,
    viewers: BTreeSet<UserId>,
}

impl RepositoryRoleState {
    /// State of a freshly created repository: an owner and nobody else.
    pub fn with_owner(owner_id: UserId) -> Self {
        RepositoryRoleState {
            owner_id,
            admins: BTreeSet::new(),
            collaborators: BTreeSet::new(),
            viewers: BTreeSet::new(),
        }
    }

    pub fn new(
        owner_id: UserId,
        admins: BTreeSet<UserId>,
        collaborators: BTreeSet<UserId>,
        viewers: BTreeSet<UserId>,
    ) -> Result<Self, RoleStateError> {
        let sets = [&admins, &collaborators, &viewers];
        if sets.iter().any(|set| set.contains(&owner_id)) {
            return Err(RoleStateError::OwnerListed(owner_id));
        }
        for (i, left) in sets.iter().enumerate() {
            for right in &sets[i + 1..] {
                if let Some(user) = left.intersection(right).next() {
                    return Err(RoleStateError::MultipleRoles(*user));
                }
            }
        }

        Ok(RepositoryRoleState {
            owner_id,
            admins,
            collaborators,
            viewers,
        })
    }

    /// Builds a state from `(user, role)` membership rows.
    pub fn from_members<I>(owner_id: UserId, members: I) -> Result<Self, RoleStateError>
    where
        I: IntoIterator<Item = (UserId, AssignableRole)>,
    {
        let mut sets: [BTreeSet<UserId>; 3] = Default::default();
        for (user, role) in members {
            let set = match role {
                AssignableRole::Admin => &mut sets[0],
                AssignableRole::Collaborator => &mut sets[1],
                AssignableRole::Viewer => &mut sets[2],
            };
            if !set.insert(user) {
                return Err(RoleStateError::MultipleRoles(user));
            }
        }
        let [admins, collaborators, viewers] = sets;
        Self::new(owner_id, admins, collaborators, viewers)
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn members(&self, role: AssignableRole) -> &BTreeSet<UserId> {
        match role {
            AssignableRole::Admin => &self.admins,
            AssignableRole::Collaborator => &self.collaborators,
            AssignableRole::Viewer => &self.viewers,
        }
    }

    fn set_mut(&mut self, role: AssignableRole) -> &mut BTreeSet<UserId> {
        match role {
            AssignableRole::Admin => &mut self.admins,
            AssignableRole::Collaborator => &mut self.collaborators,
            AssignableRole::Viewer => &mut self.viewers,
        }
    }

    /// Highest-ranked role held by `user`; owner is checked first.
    pub fn role_of(&self, user: UserId) -> Role {
        if self.owner_id == user {
            return Role::Owner;
        }
        AssignableRole::ALL
            .into_iter()
            .find(|role| self.members(*role).contains(&user))
            .map(AssignableRole::role)
            .unwrap_or(Role::None)
    }

    /// Applies an approved mutation.
    ///
    /// The mutation must target a non-owner and `remove_from` must name the
    /// target's current set, otherwise the state is left untouched.
    pub fn apply(&mut self, mutation: &RoleMutation) -> Result<(), RoleStateError> {
        if mutation.target == self.owner_id {
            return Err(RoleStateError::OwnerListed(self.owner_id));
        }
        let current = AssignableRole::try_from(self.role_of(mutation.target)).ok();
        if current != mutation.remove_from {
            return Err(RoleStateError::StaleMutation(mutation.target));
        }

        if let Some(old) = mutation.remove_from {
            self.set_mut(old).remove(&mutation.target);
        }
        self.set_mut(mutation.add_to).insert(mutation.target);
        Ok(())
    }
}

/// Membership change produced by an allowed role grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleMutation {
    pub target: UserId,
    pub remove_from: Option<AssignableRole>,
    pub add_to: AssignableRole,
}

/// Monotonic counter bumped by every applied [`RoleMutation`].
#[derive(
    Debug, Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
pub struct RoleVersion(pub u64);

impl RoleVersion {
    pub fn next(self) -> Self {
        RoleVersion(self.0 + 1)
    }
}

use crate::application_port::*;
use crate::domain::{resolve, Decision, DenyKind};
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealRoleService {
    user_repo: Arc<dyn UserRepo>,
    role_repo: Arc<dyn RepoRoleRepo>,
    tx_manager: Arc<dyn TxManager>,
    max_attempts: u32,
}

enum Attempt {
    Done(RoleAssignment),
    Raced,
}

impl RealRoleService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        role_repo: Arc<dyn RepoRoleRepo>,
        tx_manager: Arc<dyn TxManager>,
        max_attempts: u32,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            tx_manager,
            max_attempts: max_attempts.max(1),
        }
    }

    /// One read-resolve-write cycle inside a single transaction.
    async fn try_assign(&self, input: &AssignRoleInput) -> Result<Attempt, RoleError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RoleError::Store(e.to_string()))?;

        let snapshot = self
            .role_repo
            .load_in_tx(&mut *tx, input.repository_id)
            .await?
            .ok_or(RoleError::RepositoryNotFound)?;
        if !self
            .user_repo
            .id_exists_in_tx(&mut *tx, input.caller_id)
            .await?
        {
            return Err(RoleError::CallerNotFound);
        }
        if !self
            .user_repo
            .id_exists_in_tx(&mut *tx, input.target_id)
            .await?
        {
            return Err(RoleError::TargetNotFound);
        }

        let (previous_role, mutation) = match resolve(
            &snapshot.state,
            input.caller_id,
            input.target_id,
            input.role,
        ) {
            Decision::Allowed {
                target_role,
                mutation,
                ..
            } => (target_role, mutation),
            Decision::Denied { kind, message } => {
                debug!(
                    repository_id = %input.repository_id,
                    caller_id = %input.caller_id,
                    target_id = %input.target_id,
                    role = %input.role,
                    ?kind,
                    "role change denied"
                );
                return Err(match kind {
                    DenyKind::Unauthorized => RoleError::Unauthorized(message),
                    DenyKind::Forbidden => RoleError::Forbidden(message),
                });
            }
        };

        match self
            .role_repo
            .apply_in_tx(&mut *tx, input.repository_id, snapshot.version, &mutation)
            .await?
        {
            ApplyOutcome::Applied { version } => {
                tx.commit()
                    .await
                    .map_err(|e| RoleError::Store(e.to_string()))?;

                info!(
                    repository_id = %input.repository_id,
                    caller_id = %input.caller_id,
                    target_id = %input.target_id,
                    from = %previous_role,
                    to = %input.role,
                    version = version.0,
                    "role changed"
                );
                Ok(Attempt::Done(RoleAssignment {
                    repository_id: input.repository_id,
                    target_id: input.target_id,
                    previous_role,
                    role: input.role,
                    message: format!("User assigned to {} role successfully", input.role),
                }))
            }
            ApplyOutcome::VersionMismatch => {
                tx.rollback()
                    .await
                    .map_err(|e| RoleError::Store(e.to_string()))?;
                Ok(Attempt::Raced)
            }
        }
    }
}

#[async_trait::async_trait]
impl RoleService for RealRoleService {
    async fn assign_role(&self, input: AssignRoleInput) -> Result<RoleAssignment, RoleError> {
        for attempt in 1..=self.max_attempts {
            match self.try_assign(&input).await? {
                Attempt::Done(assignment) => return Ok(assignment),
                Attempt::Raced => {
                    debug!(
                        repository_id = %input.repository_id,
                        attempt,
                        "role state changed concurrently, retrying"
                    );
                }
            }
        }

        warn!(
            repository_id = %input.repository_id,
            attempts = self.max_attempts,
            "giving up role change after repeated conflicts"
        );
        Err(RoleError::Conflict {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::test_utils::{Backend, RacingRoleRepo};
    use crate::domain_model::*;

    fn assign(
        repository: &Repository,
        caller: &UserProfile,
        target: &UserProfile,
        role: AssignableRole,
    ) -> AssignRoleInput {
        AssignRoleInput {
            repository_id: repository.id,
            caller_id: caller.id,
            target_id: target.id,
            role,
        }
    }

    #[tokio::test]
    async fn owner_assigns_admin() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;

        let assignment = backend
            .role_service()
            .assign_role(assign(&repository, &owner, &ada, AssignableRole::Admin))
            .await
            .unwrap();

        assert_eq!(assignment.previous_role, Role::None);
        assert_eq!(assignment.message, "User assigned to admin role successfully");
        let snapshot = backend.snapshot(repository.id).await;
        assert_eq!(snapshot.state.role_of(ada.id), Role::Admin);
        assert_eq!(snapshot.version, RoleVersion(1));
    }

    #[tokio::test]
    async fn admin_moves_viewer_to_collaborator() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let admin = backend.user("admin").await;
        let bob = backend.user("bob").await;
        let repository = backend.repository(&owner, "repo", true).await;
        backend
            .grant(&repository, &owner, &admin, AssignableRole::Admin)
            .await;
        backend
            .grant(&repository, &owner, &bob, AssignableRole::Viewer)
            .await;

        let assignment = backend
            .role_service()
            .assign_role(assign(
                &repository,
                &admin,
                &bob,
                AssignableRole::Collaborator,
            ))
            .await
            .unwrap();

        assert_eq!(assignment.previous_role, Role::Viewer);
        let state = backend.snapshot(repository.id).await.state;
        assert!(!state.members(AssignableRole::Viewer).contains(&bob.id));
        assert!(state.members(AssignableRole::Collaborator).contains(&bob.id));
    }

    #[tokio::test]
    async fn denial_leaves_state_untouched() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let admin = backend.user("admin").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;
        backend
            .grant(&repository, &owner, &admin, AssignableRole::Admin)
            .await;
        let before = backend.snapshot(repository.id).await;

        let err = backend
            .role_service()
            .assign_role(assign(&repository, &admin, &ada, AssignableRole::Admin))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, RoleError::Forbidden(m) if m == "As a admin, you cannot assign the admin role"),
            "{err:?}"
        );

        let err = backend
            .role_service()
            .assign_role(assign(&repository, &ada, &admin, AssignableRole::Viewer))
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::Unauthorized(_)), "{err:?}");

        assert_eq!(backend.snapshot(repository.id).await, before);
    }

    #[tokio::test]
    async fn missing_records_are_reported_in_order() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;
        let service = backend.role_service();
        let ghost = UserId(uuid::Uuid::new_v4());

        let err = service
            .assign_role(AssignRoleInput {
                repository_id: RepositoryId(uuid::Uuid::new_v4()),
                caller_id: ghost,
                target_id: ghost,
                role: AssignableRole::Viewer,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::RepositoryNotFound));

        let err = service
            .assign_role(AssignRoleInput {
                caller_id: ghost,
                ..assign(&repository, &owner, &ada, AssignableRole::Viewer)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::CallerNotFound));

        let err = service
            .assign_role(AssignRoleInput {
                target_id: ghost,
                ..assign(&repository, &owner, &ada, AssignableRole::Viewer)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::TargetNotFound));
    }

    #[tokio::test]
    async fn retries_after_concurrent_change() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;
        let racing = Arc::new(RacingRoleRepo::new(backend.role_repo(), 2));
        let service = RealRoleService::new(
            backend.user_repo(),
            racing.clone(),
            backend.tx_manager(),
            3,
        );

        service
            .assign_role(assign(&repository, &owner, &ada, AssignableRole::Viewer))
            .await
            .unwrap();

        assert_eq!(racing.apply_calls(), 3);
        let snapshot = backend.snapshot(repository.id).await;
        assert_eq!(snapshot.state.role_of(ada.id), Role::Viewer);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;
        let racing = Arc::new(RacingRoleRepo::new(backend.role_repo(), u32::MAX));
        let service = RealRoleService::new(
            backend.user_repo(),
            racing.clone(),
            backend.tx_manager(),
            2,
        );

        let err = service
            .assign_role(assign(&repository, &owner, &ada, AssignableRole::Viewer))
            .await
            .unwrap_err();

        assert!(matches!(err, RoleError::Conflict { attempts: 2 }));
        assert_eq!(racing.apply_calls(), 2);
        assert_eq!(backend.snapshot(repository.id).await.state.role_of(ada.id), Role::None);
    }

    #[tokio::test]
    async fn concurrent_grants_never_double_book_a_user() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let ada = backend.user("ada").await;
        let repository = backend.repository(&owner, "repo", true).await;
        let service = Arc::new(RealRoleService::new(
            backend.user_repo(),
            backend.role_repo(),
            backend.tx_manager(),
            16,
        ));

        let mut handles = Vec::new();
        for role in [
            AssignableRole::Admin,
            AssignableRole::Collaborator,
            AssignableRole::Viewer,
            AssignableRole::Collaborator,
        ] {
            let service = service.clone();
            let input = assign(&repository, &owner, &ada, role);
            handles.push(tokio::spawn(async move { service.assign_role(input).await }));
        }
        for handle in handles {
            // later grants may be denied as re-grants, never partially applied
            let _ = handle.await.unwrap();
        }

        let state = backend.snapshot(repository.id).await.state;
        let holding = AssignableRole::ALL
            .into_iter()
            .filter(|role| state.members(*role).contains(&ada.id))
            .count();
        assert_eq!(holding, 1);
    }
}

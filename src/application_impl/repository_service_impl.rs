use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

pub struct RealRepositoryService {
    user_repo: Arc<dyn UserRepo>,
    repository_repo: Arc<dyn RepositoryRepo>,
    role_repo: Arc<dyn RepoRoleRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealRepositoryService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        repository_repo: Arc<dyn RepositoryRepo>,
        role_repo: Arc<dyn RepoRoleRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            user_repo,
            repository_repo,
            role_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl RepositoryService for RealRepositoryService {
    async fn create(&self, input: CreateRepositoryInput) -> Result<Repository, RepositoryError> {
        let name = RepositoryName::parse(input.name.trim())?;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        if !self
            .user_repo
            .id_exists_in_tx(&mut *tx, input.owner_id)
            .await?
        {
            return Err(RepositoryError::OwnerNotFound);
        }

        // the owner is recorded as owner only, never as an admin
        let now = Utc::now();
        let repository = Repository {
            id: RepositoryId(uuid::Uuid::new_v4()),
            owner_id: input.owner_id,
            name,
            description: input.description,
            is_public: input.is_public,
            created_at: now,
            updated_at: now,
        };
        match self
            .repository_repo
            .insert_in_tx(&mut *tx, &repository)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(RepositoryError::AlreadyExists),
            Err(e) => return Err(e.into()),
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        info!(
            repository_id = %repository.id,
            owner_id = %repository.owner_id,
            name = %repository.name,
            "repository created"
        );
        Ok(repository)
    }

    async fn check_name(&self, owner_id: UserId, name: &str) -> Result<NameCheck, RepositoryError> {
        let name = RepositoryName::parse(name.trim())?;
        let existing = self
            .repository_repo
            .find_by_owner_and_name(owner_id, &name)
            .await?;

        Ok(match existing {
            Some(_) => NameCheck {
                available: false,
                message: "Repository under the same name already exists!".to_string(),
            },
            None => NameCheck {
                available: true,
                message: "Looks Good !".to_string(),
            },
        })
    }

    async fn access_view(
        &self,
        owner_username: &str,
        name: &str,
        viewer: Option<UserId>,
    ) -> Result<RepositoryAccessView, RepositoryError> {
        let owner = self
            .user_repo
            .find_by_username(owner_username)
            .await?
            .ok_or(RepositoryError::OwnerNotFound)?;
        let name = RepositoryName::parse(name).map_err(|_| RepositoryError::NotFound)?;
        let repository = self
            .repository_repo
            .find_by_owner_and_name(owner.user_id, &name)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let snapshot = self.role_repo.load(repository.id).await?.ok_or_else(|| {
            RepositoryError::Store(format!("no role state for repository {}", repository.id))
        })?;
        let state = &snapshot.state;

        let viewer_role = viewer.map_or(Role::None, |v| state.role_of(v));
        if !repository.is_public && viewer_role == Role::None {
            debug!(repository_id = %repository.id, ?viewer, "repository access denied");
            return Err(RepositoryError::AccessDenied);
        }

        let member_ids = AssignableRole::ALL
            .into_iter()
            .flat_map(|role| state.members(role).iter().copied())
            .collect::<Vec<_>>();
        let mut profiles = self
            .user_repo
            .get_many(&member_ids)
            .await?
            .into_iter()
            .map(|record| (record.user_id, UserSummary::from(record)))
            .collect::<HashMap<_, _>>();
        let mut summaries = |role: AssignableRole| {
            let mut users = state
                .members(role)
                .iter()
                .filter_map(|id| profiles.remove(id))
                .collect::<Vec<_>>();
            users.sort_by(|a, b| a.username.cmp(&b.username));
            users
        };

        Ok(RepositoryAccessView {
            admins: summaries(AssignableRole::Admin),
            collaborators: summaries(AssignableRole::Collaborator),
            viewers: summaries(AssignableRole::Viewer),
            owner: owner.into(),
            repository,
            viewer_role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::test_utils::Backend;

    fn input(owner_id: UserId, name: &str, is_public: bool) -> CreateRepositoryInput {
        CreateRepositoryInput {
            owner_id,
            name: name.to_string(),
            description: String::new(),
            is_public,
        }
    }

    #[tokio::test]
    async fn create_records_owner_without_admin_entry() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let repository = backend
            .repository_service()
            .create(input(owner.id, "repohub", true))
            .await
            .unwrap();

        let snapshot = backend.snapshot(repository.id).await;
        assert_eq!(snapshot.state.owner_id(), owner.id);
        assert!(snapshot.state.members(AssignableRole::Admin).is_empty());
        assert_eq!(snapshot.version, RoleVersion(0));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_per_owner() {
        let backend = Backend::new();
        let service = backend.repository_service();
        let ada = backend.user("ada").await;
        let bob = backend.user("bob").await;

        service.create(input(ada.id, "same", true)).await.unwrap();
        let err = service.create(input(ada.id, "same", true)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists));

        // another owner may reuse it
        service.create(input(bob.id, "same", true)).await.unwrap();
    }

    #[tokio::test]
    async fn create_requires_existing_owner_and_valid_name() {
        let backend = Backend::new();
        let service = backend.repository_service();

        let err = service
            .create(input(UserId(uuid::Uuid::new_v4()), "repo", true))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::OwnerNotFound));

        let owner = backend.user("owner").await;
        let err = service.create(input(owner.id, ".git", true)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[tokio::test]
    async fn check_name_reports_availability() {
        let backend = Backend::new();
        let service = backend.repository_service();
        let owner = backend.user("owner").await;

        assert!(service.check_name(owner.id, "repo").await.unwrap().available);
        service.create(input(owner.id, "repo", true)).await.unwrap();

        let check = service.check_name(owner.id, "repo").await.unwrap();
        assert!(!check.available);
        assert_eq!(check.message, "Repository under the same name already exists!");
    }

    #[tokio::test]
    async fn access_view_lists_members_by_role() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let viewer = backend.user("viewer").await;
        let admin = backend.user("admin").await;
        let repository = backend.repository(&owner, "private", false).await;
        backend
            .grant(&repository, &owner, &admin, AssignableRole::Admin)
            .await;
        backend
            .grant(&repository, &owner, &viewer, AssignableRole::Viewer)
            .await;

        let view = backend
            .repository_service()
            .access_view("owner", "private", Some(viewer.id))
            .await
            .unwrap();

        assert_eq!(view.owner.id, owner.id);
        assert_eq!(view.admins.iter().map(|u| u.id).collect::<Vec<_>>(), vec![admin.id]);
        assert!(view.collaborators.is_empty());
        assert_eq!(view.viewers.iter().map(|u| u.id).collect::<Vec<_>>(), vec![viewer.id]);
        assert_eq!(view.viewer_role, Role::Viewer);
    }

    #[tokio::test]
    async fn private_repository_hidden_from_outsiders() {
        let backend = Backend::new();
        let owner = backend.user("owner").await;
        let outsider = backend.user("outsider").await;
        backend.repository(&owner, "private", false).await;
        backend.repository(&owner, "public", true).await;
        let service = backend.repository_service();

        let err = service
            .access_view("owner", "private", Some(outsider.id))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AccessDenied));
        let err = service.access_view("owner", "private", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AccessDenied));

        let view = service
            .access_view("owner", "public", Some(outsider.id))
            .await
            .unwrap();
        assert_eq!(view.viewer_role, Role::None);

        let err = service.access_view("owner", "missing", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        let err = service.access_view("nobody", "public", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::OwnerNotFound));
    }
}

use super::util::{downcast, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use sqlx::{MySqlConnection, MySqlPool, Row};

pub struct MySqlRepoRoleRepo {
    pool: MySqlPool,
}

impl MySqlRepoRoleRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

async fn fetch_snapshot(
    conn: &mut MySqlConnection,
    repository_id: RepositoryId,
) -> Result<Option<RoleSnapshot>, StoreError> {
    let Some(row) =
        sqlx::query("SELECT owner_id, role_version FROM repository WHERE repo_id = ?")
            .bind(repository_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(store_err("query role version"))?
    else {
        return Ok(None);
    };
    let owner_id: UserId = row
        .try_get("owner_id")
        .map_err(|e| StoreError::Corrupt(format!("decode owner_id: {e}")))?;
    let version: u64 = row
        .try_get("role_version")
        .map_err(|e| StoreError::Corrupt(format!("decode role_version: {e}")))?;

    let rows = sqlx::query("SELECT user_id, role FROM repository_member WHERE repo_id = ?")
        .bind(repository_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(store_err("query members"))?;

    let mut members = Vec::with_capacity(rows.len());
    for row in rows {
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| StoreError::Corrupt(format!("decode member id: {e}")))?;
        let role_str: &str = row
            .try_get("role")
            .map_err(|e| StoreError::Corrupt(format!("decode member role: {e}")))?;
        let role = role_str
            .parse::<AssignableRole>()
            .map_err(|_| StoreError::Corrupt(format!("bad role name: {role_str}")))?;
        members.push((user_id, role));
    }

    let state = RepositoryRoleState::from_members(owner_id, members)
        .map_err(|e| StoreError::Corrupt(format!("repository {repository_id}: {e}")))?;

    Ok(Some(RoleSnapshot {
        state,
        version: RoleVersion(version),
    }))
}

#[async_trait::async_trait]
impl RepoRoleRepo for MySqlRepoRoleRepo {
    async fn load_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
    ) -> Result<Option<RoleSnapshot>, StoreError> {
        let tx = downcast(tx)?;
        fetch_snapshot(tx.conn(), repository_id).await
    }

    async fn load(&self, repository_id: RepositoryId) -> Result<Option<RoleSnapshot>, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(store_err("acquire connection"))?;
        fetch_snapshot(&mut conn, repository_id).await
    }

    async fn apply_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
        expected: RoleVersion,
        mutation: &RoleMutation,
    ) -> Result<ApplyOutcome, StoreError> {
        let tx = downcast(tx)?;

        // 1) Claim the version. The row lock serializes concurrent writers.
        let claimed = sqlx::query(
            r#"
UPDATE repository
SET role_version = role_version + 1, updated_at = CURRENT_TIMESTAMP(6)
WHERE repo_id = ? AND role_version = ?
"#,
        )
        .bind(repository_id)
        .bind(expected.0)
        .execute(tx.conn())
        .await
        .map_err(store_err("bump role version"))?;

        if claimed.rows_affected() == 0 {
            debug!(%repository_id, ?expected, "role version moved");
            return Ok(ApplyOutcome::VersionMismatch);
        }

        // 2) Leave the previous role
        if let Some(old) = mutation.remove_from {
            sqlx::query(
                "DELETE FROM repository_member WHERE repo_id = ? AND user_id = ? AND role = ?",
            )
            .bind(repository_id)
            .bind(mutation.target)
            .bind(old.as_str())
            .execute(tx.conn())
            .await
            .map_err(store_err("remove member role"))?;
        }

        // 3) Join the new one
        sqlx::query("INSERT INTO repository_member (repo_id, user_id, role) VALUES (?, ?, ?)")
            .bind(repository_id)
            .bind(mutation.target)
            .bind(mutation.add_to.as_str())
            .execute(tx.conn())
            .await
            .map_err(store_err("add member role"))?;

        Ok(ApplyOutcome::Applied {
            version: expected.next(),
        })
    }
}

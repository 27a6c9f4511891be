use super::util::{downcast, is_dup_key, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySqlPool, Row};

pub struct MySqlRepositoryRepo {
    pool: MySqlPool,
}

impl MySqlRepositoryRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRepositoryRepo { pool }
    }
}

#[async_trait::async_trait]
impl RepositoryRepo for MySqlRepositoryRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository: &Repository,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        // role_version starts at its column default
        sqlx::query(
            r#"
INSERT INTO repository (repo_id, owner_id, name, description, is_public, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(repository.id)
        .bind(repository.owner_id)
        .bind(repository.name.as_str())
        .bind(&repository.description)
        .bind(repository.is_public)
        .bind(repository.created_at)
        .bind(repository.updated_at)
        .execute(tx.conn())
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                StoreError::Duplicate(format!(
                    "repository {}/{}",
                    repository.owner_id, repository.name
                ))
            } else {
                StoreError::Backend(format!("insert repository: {e}"))
            }
        })?;

        Ok(())
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &RepositoryName,
    ) -> Result<Option<Repository>, StoreError> {
        let Some(row) = sqlx::query(
            r#"
SELECT repo_id, description, is_public, created_at, updated_at
FROM repository
WHERE owner_id = ? AND name = ?
"#,
        )
        .bind(owner_id)
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("query repository"))?
        else {
            return Ok(None);
        };

        let decode = |e: sqlx::Error| StoreError::Corrupt(format!("decode repository: {e}"));
        Ok(Some(Repository {
            id: row.try_get("repo_id").map_err(decode)?,
            owner_id,
            name: name.clone(),
            description: row.try_get("description").map_err(decode)?,
            is_public: row.try_get("is_public").map_err(decode)?,
            created_at: row.try_get("created_at").map_err(decode)?,
            updated_at: row.try_get("updated_at").map_err(decode)?,
        }))
    }
}

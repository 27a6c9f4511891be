use super::util::{downcast, is_dup_key, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

const USER_COLUMNS: &str = "user_id, username, email, avatar_url, bio, created_at";

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

fn user_from_row(row: &MySqlRow) -> Result<UserRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Corrupt(format!("decode user: {e}"));
    Ok(UserRecord {
        user_id: row.try_get("user_id").map_err(decode)?,
        username: row.try_get("username").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        avatar_url: row.try_get("avatar_url").map_err(decode)?,
        bio: row.try_get("bio").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO user (user_id, username, email, avatar_url, bio, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.avatar_url)
        .bind(&record.bio)
        .bind(record.created_at)
        .execute(tx.conn())
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                StoreError::Duplicate(format!("email {}", record.email))
            } else {
                StoreError::Backend(format!("insert user: {e}"))
            }
        })?;

        Ok(())
    }

    async fn id_exists_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(tx.conn())
            .await
            .map_err(store_err("user exists"))?;

        Ok(count > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("query user by email"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE username = ? ORDER BY created_at LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("query user by username"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_many(&self, user_ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            QueryBuilder::<MySql>::new(format!("SELECT {USER_COLUMNS} FROM user WHERE user_id IN ("));
        let mut ids = query.separated(", ");
        for user_id in user_ids {
            ids.push_bind(*user_id);
        }
        ids.push_unseparated(")");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("query users"))?;

        rows.iter().map(user_from_row).collect()
    }
}

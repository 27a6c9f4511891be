use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

/// Recovers the concrete transaction behind a `dyn StorageTx`, refusing
/// transactions opened by any other store.
pub(super) fn downcast<'a, 't>(
    tx: &'a mut dyn StorageTx<'t>,
) -> Result<&'a mut MySqlTx<'t>, StoreError> {
    if tx.store_name() != MySqlTx::STORE_NAME {
        return Err(StoreError::Backend(format!(
            "{} transaction passed to the mysql store",
            tx.store_name()
        )));
    }
    // SAFETY: `MySqlTx` is the only `StorageTx` reporting `MySqlTx::STORE_NAME`,
    // so the data pointer behind `tx` is a `MySqlTx<'t>`.
    Ok(unsafe { &mut *(tx as *mut dyn StorageTx<'t> as *mut MySqlTx<'t>) })
}

pub(super) fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

pub(super) fn store_err(context: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::Backend(format!("{context}: {e}"))
}

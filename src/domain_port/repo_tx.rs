/// Opens storage transactions. Repositories taking a `&mut dyn StorageTx`
/// must come from the same backend as the manager that opened it.
#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// Dropping a transaction without committing rolls it back.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    /// Name of the store that opened this transaction.
    fn store_name(&self) -> &'static str;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

use crate::domain_port::{StorageTx, TxManager};

#[derive(Debug, Default)]
pub struct MemoryTxManager;

impl MemoryTxManager {
    pub fn new() -> Self {
        MemoryTxManager
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemoryTx))
    }
}

pub struct MemoryTx;

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    fn store_name(&self) -> &'static str {
        "memory"
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

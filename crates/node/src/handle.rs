use alloy_primitives::{Address, Bytes, TxHash};
use blockcast_types::PendingTx;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    oneshot
};

use crate::{
    error::NodeError,
    events::NodeEvent,
    traits::{FetchedBlock, NodeRpc}
};

/// Commands accepted by the spawned [`NodeManager`](crate::NodeManager).
#[derive(Debug)]
pub enum NodeCommand {
    FetchTransaction {
        hash: TxHash,
        tx:   oneshot::Sender<Result<Option<PendingTx>, NodeError>>
    },
    FetchBlock {
        number: u64,
        full:   bool,
        tx:     oneshot::Sender<Result<Option<FetchedBlock>, NodeError>>
    },
    Call {
        to:   Address,
        data: Bytes,
        tx:   oneshot::Sender<Result<Bytes, NodeError>>
    },
    /// Register a new event listener.
    Subscribe(UnboundedSender<NodeEvent>),
    /// Force a session teardown and reconnect. Idempotent while a reconnect
    /// is already in progress.
    Reconnect
}

/// Cheap clonable handle to the node session task.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    sender: UnboundedSender<NodeCommand>
}

impl NodeHandle {
    pub(crate) fn new(sender: UnboundedSender<NodeCommand>) -> Self {
        Self { sender }
    }

    /// Registers an event listener. Events produced before registration are
    /// not replayed.
    pub fn subscribe_events(&self) -> UnboundedReceiver<NodeEvent> {
        let (tx, rx) = unbounded_channel();
        let _ = self.sender.send(NodeCommand::Subscribe(tx));
        rx
    }

    pub fn reconnect(&self) {
        let _ = self.sender.send(NodeCommand::Reconnect);
    }

    async fn request<T>(
        &self,
        command: NodeCommand,
        rx: oneshot::Receiver<Result<T, NodeError>>
    ) -> Result<T, NodeError> {
        self.sender.send(command).map_err(|_| NodeError::Terminated)?;
        rx.await.map_err(|_| NodeError::Terminated)?
    }
}

#[async_trait::async_trait]
impl NodeRpc for NodeHandle {
    async fn transaction(&self, hash: TxHash) -> Result<Option<PendingTx>, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.request(NodeCommand::FetchTransaction { hash, tx }, rx).await
    }

    async fn block(&self, number: u64, full: bool) -> Result<Option<FetchedBlock>, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.request(NodeCommand::FetchBlock { number, full, tx }, rx).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.request(NodeCommand::Call { to, data, tx }, rx).await
    }
}

use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    providers::{Provider, RootProvider, WsConnect},
    pubsub::{PubSubFrontend, SubscriptionStream},
    rpc::{
        client::ClientBuilder,
        types::{Block, BlockTransactionsKind, TransactionRequest}
    }
};
use alloy_primitives::{Address, Bytes, TxHash, B256};
use blockcast_types::PendingTx;
use blockcast_utils::ShutdownSignal;
use futures::StreamExt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    convert::{block_from_rpc, tx_from_rpc},
    error::{classify_rpc_error, NodeError},
    events::NodeEvent,
    handle::{NodeCommand, NodeHandle},
    traits::FetchedBlock
};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(10);
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the live loop returned.
enum LoopExit {
    Shutdown,
    Restart
}

struct LiveSession {
    provider: RootProvider<PubSubFrontend>,
    pending:  SubscriptionStream<B256>,
    heads:    SubscriptionStream<Block>
}

/// Owns the WebSocket session to the execution node.
///
/// State machine: Disconnected -> Connecting -> Live -> Reconnecting -> ...
/// Only this task touches the raw transport; everything else goes through
/// [`NodeHandle`].
pub struct NodeManager {
    url:             Url,
    commands:        UnboundedReceiver<NodeCommand>,
    event_listeners: Vec<UnboundedSender<NodeEvent>>,
    shutdown:        ShutdownSignal
}

impl NodeManager {
    /// Spawns the session task and returns its handle.
    pub fn spawn(url: Url, shutdown: ShutdownSignal) -> NodeHandle {
        let (tx, rx) = unbounded_channel();
        let this = Self { url, commands: rx, event_listeners: Vec::new(), shutdown };
        tokio::spawn(this.run());
        NodeHandle::new(tx)
    }

    async fn run(mut self) {
        let mut backoff = RECONNECT_DELAY;

        loop {
            if self.shutdown.is_shutdown() {
                break
            }

            match self.connect().await {
                Ok(session) => {
                    info!(target: "node", url = %self.url, "node session live");
                    backoff = RECONNECT_DELAY;
                    // listeners clear stream-derived state before any event
                    // from the fresh session reaches them
                    self.notify(NodeEvent::SessionReset);

                    match self.live(session).await {
                        LoopExit::Shutdown => break,
                        LoopExit::Restart => {}
                    }
                }
                Err(err) => {
                    warn!(target: "node", %err, "node connection failed");
                }
            }

            warn!(target: "node", delay_secs = backoff.as_secs(), "reconnecting");
            if let LoopExit::Shutdown = self.wait_backoff(backoff).await {
                break
            }
            backoff = (backoff * 2).min(RECONNECT_MAX_DELAY);
        }

        debug!(target: "node", "node manager stopped");
    }

    async fn connect(&self) -> Result<LiveSession, NodeError> {
        let client = ClientBuilder::default()
            .ws(WsConnect::new(self.url.as_str()))
            .await
            .map_err(classify_rpc_error)?;
        let provider = RootProvider::<PubSubFrontend>::new(client);

        let pending = provider
            .subscribe_pending_transactions()
            .await
            .map_err(classify_rpc_error)?
            .into_stream();
        let heads = provider
            .subscribe_blocks()
            .await
            .map_err(classify_rpc_error)?
            .into_stream();

        Ok(LiveSession { provider, pending, heads })
    }

    async fn live(&mut self, mut session: LiveSession) -> LoopExit {
        loop {
            tokio::select! {
                _ = self.shutdown.wait() => return LoopExit::Shutdown,

                command = self.commands.recv() => match command {
                    None => return LoopExit::Shutdown,
                    Some(command) => {
                        if let Some(exit) = self.on_command(command, &session.provider) {
                            return exit
                        }
                    }
                },

                hash = session.pending.next() => match hash {
                    Some(hash) => self.notify(NodeEvent::PendingTransaction(hash)),
                    None => {
                        warn!(target: "node", "pending subscription ended");
                        return LoopExit::Restart
                    }
                },

                block = session.heads.next() => match block {
                    Some(block) => {
                        let head = block_from_rpc(block).block;
                        debug!(target: "node", number = head.number, "new head");
                        self.notify(NodeEvent::NewHead(head));
                    }
                    None => {
                        warn!(target: "node", "head subscription ended");
                        return LoopExit::Restart
                    }
                }
            }
        }
    }

    /// Drains commands during the reconnect delay so callers fail fast
    /// instead of hanging on a dead session.
    async fn wait_backoff(&mut self, delay: Duration) -> LoopExit {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => return LoopExit::Shutdown,
                _ = &mut sleep => return LoopExit::Restart,
                command = self.commands.recv() => match command {
                    None => return LoopExit::Shutdown,
                    Some(command) => self.on_command_disconnected(command)
                }
            }
        }
    }

    fn on_command(
        &mut self,
        command: NodeCommand,
        provider: &RootProvider<PubSubFrontend>
    ) -> Option<LoopExit> {
        match command {
            NodeCommand::Subscribe(listener) => self.event_listeners.push(listener),
            NodeCommand::Reconnect => {
                warn!(target: "node", "reconnect requested, tearing down session");
                return Some(LoopExit::Restart)
            }
            NodeCommand::FetchTransaction { hash, tx } => {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let _ = tx.send(fetch_transaction(provider, hash).await);
                });
            }
            NodeCommand::FetchBlock { number, full, tx } => {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let _ = tx.send(fetch_block(provider, number, full).await);
                });
            }
            NodeCommand::Call { to, data, tx } => {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let _ = tx.send(eth_call(provider, to, data).await);
                });
            }
        }
        None
    }

    fn on_command_disconnected(&mut self, command: NodeCommand) {
        match command {
            NodeCommand::Subscribe(listener) => self.event_listeners.push(listener),
            // already reconnecting, a second request is a no-op
            NodeCommand::Reconnect => {}
            NodeCommand::FetchTransaction { tx, .. } => {
                let _ = tx.send(Err(NodeError::Disconnected));
            }
            NodeCommand::FetchBlock { tx, .. } => {
                let _ = tx.send(Err(NodeError::Disconnected));
            }
            NodeCommand::Call { tx, .. } => {
                let _ = tx.send(Err(NodeError::Disconnected));
            }
        }
    }

    fn notify(&mut self, event: NodeEvent) {
        self.event_listeners.retain(|listener| listener.send(event.clone()).is_ok());
    }
}

async fn fetch_transaction(
    provider: RootProvider<PubSubFrontend>,
    hash: TxHash
) -> Result<Option<PendingTx>, NodeError> {
    let response = tokio::time::timeout(RPC_TIMEOUT, async {
        provider.get_transaction_by_hash(hash).await
    })
    .await
    .map_err(|_| NodeError::Timeout)?;

    Ok(response.map_err(classify_rpc_error)?.map(tx_from_rpc))
}

async fn fetch_block(
    provider: RootProvider<PubSubFrontend>,
    number: u64,
    full: bool
) -> Result<Option<FetchedBlock>, NodeError> {
    let kind = if full { BlockTransactionsKind::Full } else { BlockTransactionsKind::Hashes };
    let response = tokio::time::timeout(RPC_TIMEOUT, async {
        provider.get_block_by_number(number.into(), kind.into()).await
    })
    .await
    .map_err(|_| NodeError::Timeout)?;

    Ok(response.map_err(classify_rpc_error)?.map(block_from_rpc))
}

async fn eth_call(
    provider: RootProvider<PubSubFrontend>,
    to: Address,
    data: Bytes
) -> Result<Bytes, NodeError> {
    let request = TransactionRequest::default().with_to(to).with_input(data);
    tokio::time::timeout(RPC_TIMEOUT, async { provider.call(&request).await })
        .await
        .map_err(|_| NodeError::Timeout)?
        .map_err(classify_rpc_error)
}

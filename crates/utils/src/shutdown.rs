use tokio::sync::watch;

/// Creates a linked shutdown handle/signal pair. Managers hold a
/// [`ShutdownSignal`] and stop accepting work once it fires; the binary holds
/// the [`ShutdownHandle`].
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>
}

impl ShutdownSignal {
    /// Resolves once shutdown has been requested. Also resolves if the
    /// handle was dropped, so orphaned tasks wind down rather than leak.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return
            }
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }
}

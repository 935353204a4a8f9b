use std::sync::Arc;

use futures_util::future::select_all;
use tokio::sync::watch;

/// Lifetime of whatever owns in-flight requests: a session, a view or a list.
///
/// Once cancelled, pending requests tied to the scope stop waiting and their late
/// responses are never applied. Child scopes are cancelled with their parent.
#[derive(Debug, Clone)]
pub struct Scope {
    /// This scope's flag last, its ancestors' before it.
    chain: Vec<Arc<watch::Sender<bool>>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            chain: vec![Arc::new(watch::Sender::new(false))],
        }
    }

    pub fn child(&self) -> Scope {
        let mut chain = self.chain.clone();
        chain.push(Arc::new(watch::Sender::new(false)));
        Scope { chain }
    }

    pub fn cancel(&self) {
        if let Some(own) = self.chain.last() {
            own.send_replace(true);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.chain.iter().any(|flag| *flag.borrow())
    }

    /// Resolves once this scope or any ancestor is cancelled.
    pub async fn cancelled(&self) {
        let waits = self
            .chain
            .iter()
            .map(|flag| Box::pin(wait(flag.subscribe())));
        select_all(waits).await;
    }
}

async fn wait(mut receiver: watch::Receiver<bool>) {
    // The sender lives as long as the scope being awaited, so this only errs on teardown.
    let _ = receiver.wait_for(|cancelled| *cancelled).await;
}

//! Single-writer token storage.

use tokio::sync::watch;

use super::tokens::TokenSet;

/// Create a store, returning the writer half and a reader.
///
/// Only the token manager holds the writer.
pub(crate) fn token_store(initial: Option<TokenSet>) -> (TokenWriter, TokenStore) {
    let (tx, rx) = watch::channel(initial);
    (TokenWriter { tx }, TokenStore { rx })
}

/// Read access to the current token set.
///
/// Every read is a snapshot of one complete set; a replacement is never
/// observed half-done.
#[derive(Debug, Clone)]
pub struct TokenStore {
    rx: watch::Receiver<Option<TokenSet>>,
}

impl TokenStore {
    /// Clone the current token set, if any has been acquired.
    pub fn snapshot(&self) -> Option<TokenSet> {
        self.rx.borrow().clone()
    }

    /// Wait until the token set is replaced, then return the new one.
    ///
    /// Returns `None` once the token manager has stopped.
    pub async fn changed(&mut self) -> Option<TokenSet> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

/// The writer half, owned by the token manager.
#[derive(Debug)]
pub(crate) struct TokenWriter {
    tx: watch::Sender<Option<TokenSet>>,
}

impl TokenWriter {
    pub fn current(&self) -> Option<TokenSet> {
        self.tx.borrow().clone()
    }

    /// Swap in a new token set.
    pub fn replace(&self, tokens: TokenSet) {
        self.tx.send_replace(Some(tokens));
    }
}

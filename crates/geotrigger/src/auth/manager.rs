//! The token manager: a single task that serializes token exchanges.
//!
//! Every request asks the manager for the current token set, and reports a
//! rejected token back to it. While an exchange is running, all such
//! requests are parked and later receive the same outcome, so a burst of
//! expiry detections costs one network round-trip.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::Result;
use crate::completion::Completion;
use crate::error::Error;

use super::session::Session;
use super::store::{TokenStore, TokenWriter, token_store};
use super::tokens::{AccessToken, TokenSet};

/// Queue depth for commands waiting to reach the manager.
const COMMAND_BUFFER: usize = 64;

type Reply = oneshot::Sender<Result<TokenSet>>;
type Exchange = Pin<Box<dyn Future<Output = Result<TokenSet>> + Send>>;

enum Command {
    /// Ask for a usable token set.
    Access { reply: Reply },
    /// Report that `stale` was rejected and ask for a replacement.
    Refresh { stale: AccessToken, reply: Reply },
}

enum State {
    Idle,
    Acquiring(Exchange),
    Refreshing(Exchange),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Acquiring(_) => "acquiring",
            State::Refreshing(_) => "refreshing",
        }
    }
}

/// Cloneable handle for talking to a running token manager.
#[derive(Debug, Clone)]
pub(crate) struct TokenManagerHandle {
    tx: mpsc::Sender<Command>,
}

impl TokenManagerHandle {
    /// Get the current token set, waiting for any exchange in progress.
    pub async fn access(&self) -> Result<TokenSet> {
        self.call(|reply| Command::Access { reply }).await
    }

    /// Report `stale` as rejected and wait for a replacement.
    ///
    /// If the manager already holds a different token, that token is
    /// returned without another exchange.
    pub async fn refresh(&self, stale: AccessToken) -> Result<TokenSet> {
        self.call(|reply| Command::Refresh { stale, reply }).await
    }

    async fn call(&self, command: impl FnOnce(Reply) -> Command) -> Result<TokenSet> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| Error::ManagerStopped)?;
        rx.await.map_err(|_| Error::ManagerStopped)?
    }
}

/// Start a token manager for `session`.
///
/// With `initial` tokens the manager starts idle and the returned completion
/// is already resolved; otherwise it starts by calling
/// [`Session::request_access`] and the completion reports that outcome.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn(
    session: Arc<dyn Session>,
    initial: Option<TokenSet>,
) -> (TokenManagerHandle, TokenStore, Completion<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (writer, store) = token_store(initial.clone());

    let mut manager = TokenManager {
        session,
        store: writer,
        state: State::Idle,
        waiters: Vec::new(),
        ready: None,
    };

    let ready = if initial.is_some() {
        Completion::ready(Ok(()))
    } else {
        let (ready_tx, ready) = Completion::channel();
        manager.ready = Some(ready_tx);
        manager.start_acquiring();
        ready
    };

    tokio::spawn(manager.run(rx));

    (TokenManagerHandle { tx }, store, ready)
}

struct TokenManager {
    session: Arc<dyn Session>,
    store: TokenWriter,
    state: State,
    waiters: Vec<Reply>,
    ready: Option<oneshot::Sender<Result<()>>>,
}

impl TokenManager {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        debug!(kind = %self.session.kind(), "Token manager started");

        loop {
            tokio::select! {
                outcome = next_outcome(&mut self.state), if !matches!(self.state, State::Idle) => {
                    self.complete(outcome);
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        // Let a running exchange resolve the access signal.
                        if !matches!(self.state, State::Idle) {
                            let outcome = next_outcome(&mut self.state).await;
                            self.complete(outcome);
                        }
                        break;
                    }
                },
            }
        }

        debug!("Token manager stopped");
    }

    fn handle(&mut self, command: Command) {
        if !matches!(self.state, State::Idle) {
            debug!(state = self.state.name(), "Parking request behind token exchange");
            self.waiters.push(command.into_reply());
            return;
        }

        match command {
            Command::Access { reply } => match self.store.current() {
                Some(tokens) => {
                    let _ = reply.send(Ok(tokens));
                }
                None => {
                    self.waiters.push(reply);
                    self.start_acquiring();
                }
            },
            Command::Refresh { stale, reply } => match self.store.current() {
                Some(tokens) if *tokens.access_token() != stale => {
                    debug!("Token already replaced; skipping refresh");
                    let _ = reply.send(Ok(tokens));
                }
                Some(tokens) => {
                    self.waiters.push(reply);
                    self.start_refreshing(tokens);
                }
                None => {
                    self.waiters.push(reply);
                    self.start_acquiring();
                }
            },
        }
    }

    fn start_acquiring(&mut self) {
        info!("Requesting access");
        let session = Arc::clone(&self.session);
        self.state = State::Acquiring(Box::pin(async move { session.request_access().await }));
    }

    fn start_refreshing(&mut self, current: TokenSet) {
        info!("Refreshing access token");
        let session = Arc::clone(&self.session);
        self.state = State::Refreshing(Box::pin(async move { session.refresh(&current).await }));
    }

    /// Store a successful outcome, then hand the outcome to every waiter.
    fn complete(&mut self, outcome: Result<TokenSet>) {
        let finished = std::mem::replace(&mut self.state, State::Idle);

        match &outcome {
            Ok(tokens) => {
                self.store.replace(tokens.clone());
                info!(after = finished.name(), "Token set replaced");
            }
            Err(err) => {
                warn!(after = finished.name(), error = %err, "Token exchange failed");
            }
        }

        if let Some(ready) = self.ready.take() {
            let _ = ready.send(outcome.as_ref().map(|_| ()).map_err(|err| err.clone()));
        }

        let waiters = std::mem::take(&mut self.waiters);
        debug!(waiters = waiters.len(), "Broadcasting token exchange outcome");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Command {
    fn into_reply(self) -> Reply {
        match self {
            Command::Access { reply } | Command::Refresh { reply, .. } => reply,
        }
    }
}

/// Resolve the running exchange; never resolves while idle.
async fn next_outcome(state: &mut State) -> Result<TokenSet> {
    match state {
        State::Acquiring(exchange) | State::Refreshing(exchange) => exchange.await,
        State::Idle => std::future::pending().await,
    }
}

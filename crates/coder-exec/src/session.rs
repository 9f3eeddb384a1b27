use std::sync::Arc;

use coder_core::reduce;
use coder_core::ClientAction;
use coder_core::ClientState;
use coder_core::CoderEffect;
use coder_core::UserAction;
use tokio::sync::mpsc;

use crate::backend::Backend;
use crate::executor::Dispatch;
use crate::executor::EffectExecutor;

/// Owns the client state and the only channel that mutates it.
///
/// Every change goes through [`Session::apply`]: the action is reduced,
/// request effects are spawned, and the rest are handed back to the caller.
/// Settlements come back through [`Session::next_action`] and are applied the
/// same way.
pub struct Session<B: ?Sized> {
    state: ClientState,
    executor: EffectExecutor<B>,
    rx: mpsc::UnboundedReceiver<ClientAction>,
    outstanding: usize,
}

impl<B> Session<B>
where
    B: Backend + ?Sized + 'static,
{
    pub fn new(state: ClientState, backend: Arc<B>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            executor: EffectExecutor::new(backend, tx),
            rx,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Requests started but not yet applied back to state.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn apply(&mut self, action: ClientAction) -> Vec<CoderEffect> {
        if let ClientAction::Runtime(runtime) = &action {
            if runtime.is_settlement() {
                self.outstanding = self.outstanding.saturating_sub(1);
            }
        }

        let mut local = Vec::new();
        for effect in reduce(&mut self.state, action) {
            match self.executor.dispatch(effect) {
                Dispatch::Spawned(_) => self.outstanding += 1,
                Dispatch::Local(effect) => local.push(effect),
            }
        }
        local
    }

    pub fn user(&mut self, action: UserAction) -> Vec<CoderEffect> {
        self.apply(ClientAction::User(action))
    }

    /// Waits for the next settlement without applying it.
    pub async fn next_action(&mut self) -> Option<ClientAction> {
        self.rx.recv().await
    }

    /// Applies the next settlement, or returns `None` when nothing is outstanding.
    pub async fn settle_next(&mut self) -> Option<Vec<CoderEffect>> {
        if self.outstanding == 0 {
            return None;
        }
        let action = self.rx.recv().await?;
        Some(self.apply(action))
    }

    pub async fn settle_all(&mut self) -> Vec<CoderEffect> {
        let mut local = Vec::new();
        while let Some(effects) = self.settle_next().await {
            local.extend(effects);
        }
        local
    }
}

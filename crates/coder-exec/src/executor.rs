use std::future::Future;
use std::sync::Arc;

use coder_core::ClientAction;
use coder_core::CoderEffect;
use coder_core::IngestFlow;
use coder_core::RequestFailure;
use coder_core::RuntimeAction;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::contracts::FeedbackRequest;
use crate::error::BackendError;

#[derive(Debug)]
pub enum Dispatch {
    /// A request task was started; it reports back through the action channel.
    Spawned(JoinHandle<()>),
    /// Not a request; the host handles it (redraws, clipboard).
    Local(CoderEffect),
}

/// Runs request effects as tasks on the current tokio runtime. Each task holds
/// only a sender, so a task that outlives its session just drops its result.
pub struct EffectExecutor<B: ?Sized> {
    backend: Arc<B>,
    tx: UnboundedSender<ClientAction>,
}

impl<B> EffectExecutor<B>
where
    B: Backend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, tx: UnboundedSender<ClientAction>) -> Self {
        Self { backend, tx }
    }

    pub fn dispatch(&self, effect: CoderEffect) -> Dispatch {
        match effect {
            CoderEffect::IngestText { content } => {
                Dispatch::Spawned(self.spawn("ingest_text", move |backend| async move {
                    let outcome = backend
                        .ingest_text(&content)
                        .await
                        .map_err(failure("ingest_text"));
                    RuntimeAction::IngestSettled {
                        flow: IngestFlow::Text,
                        outcome,
                    }
                }))
            }
            CoderEffect::IngestFile { file } => {
                Dispatch::Spawned(self.spawn("ingest_file", move |backend| async move {
                    let outcome = backend
                        .ingest_file(&file)
                        .await
                        .map_err(failure("ingest_file"));
                    RuntimeAction::IngestSettled {
                        flow: IngestFlow::File,
                        outcome,
                    }
                }))
            }
            CoderEffect::SubmitQuery { query } => {
                Dispatch::Spawned(self.spawn("query", move |backend| async move {
                    let outcome = backend.query(&query).await.map_err(failure("query"));
                    RuntimeAction::QuerySettled { query, outcome }
                }))
            }
            CoderEffect::SubmitFeedback {
                query,
                code,
                upvoted,
            } => Dispatch::Spawned(self.spawn("feedback", move |backend| async move {
                let request = FeedbackRequest {
                    query,
                    code,
                    upvoted,
                };
                let outcome = backend
                    .feedback(&request)
                    .await
                    .map_err(failure("feedback"));
                RuntimeAction::FeedbackSettled { upvoted, outcome }
            })),
            local @ (CoderEffect::RequestFrame | CoderEffect::CopyToClipboard(_)) => {
                Dispatch::Local(local)
            }
        }
    }

    fn spawn<F, Fut>(&self, request: &'static str, run: F) -> JoinHandle<()>
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: Future<Output = RuntimeAction> + Send + 'static,
    {
        let tx = self.tx.clone();
        let settled = run(Arc::clone(&self.backend));
        tracing::debug!(request, "request started");
        tokio::spawn(async move {
            let action = settled.await;
            if tx.send(ClientAction::Runtime(action)).is_err() {
                tracing::debug!(request, "session closed before settlement; result dropped");
            }
        })
    }
}

fn failure(request: &'static str) -> impl Fn(BackendError) -> RequestFailure {
    move |err| {
        tracing::warn!(request, error = %err, "backend request failed");
        err.to_failure()
    }
}

//! Background status polling for one image.
//!
//! The poll loop lives exactly as long as the item is being watched: it stops on a
//! terminal status, on the first failed poll, on [`StatusPoller::cancel`], or when the
//! poller is dropped. A request already in flight is allowed to finish.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::ImageApi;
use crate::error::ApiError;
use imgsuite_core::models::ImageMeta;

const UPDATE_BUFFER: usize = 8;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub type PollUpdate = Result<ImageMeta, ApiError>;

pub struct StatusPoller {
    id: String,
    updates: mpsc::Receiver<PollUpdate>,
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start polling `id` every `every` (at least 1 ms). The first poll happens immediately.
    pub fn spawn<A>(api: Arc<A>, id: impl Into<String>, every: Duration) -> Self
    where
        A: ImageApi + ?Sized + 'static,
    {
        let id = id.into();
        let every = every.max(MIN_INTERVAL);
        let (updates_tx, updates) = mpsc::channel(UPDATE_BUFFER);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(poll_loop(api, id.clone(), every, updates_tx, shutdown_rx));

        Self {
            id,
            updates,
            shutdown_tx,
            handle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Next poll result, or `None` once the loop has ended.
    pub async fn next(&mut self) -> Option<PollUpdate> {
        self.updates.recv().await
    }

    pub fn cancel(&self) {
        let _ = self.shutdown_tx.try_send(());
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn poll_loop<A>(
    api: Arc<A>,
    id: String,
    every: Duration,
    updates_tx: mpsc::Sender<PollUpdate>,
    mut shutdown_rx: mpsc::Receiver<()>,
) where
    A: ImageApi + ?Sized,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(%id, interval_ms = every.as_millis() as u64, "Status polling started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!(%id, "Status polling cancelled");
                break;
            }
            _ = ticker.tick() => {
                let result = api.get_status(&id).await;
                let done = match &result {
                    Ok(meta) => meta.status.is_terminal(),
                    Err(e) => {
                        tracing::warn!(%id, error = %e, "Status poll failed");
                        true
                    }
                };
                if updates_tx.send(result).await.is_err() {
                    break;
                }
                if done {
                    tracing::info!(%id, "Status polling finished");
                    break;
                }
            }
        }
    }
}

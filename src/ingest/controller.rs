use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::db::{Database, FrameInsert};

use super::analyzer::FrameAnalyzer;
use super::worker::{ingest_loop, FrameJob, PendingFrames};
use super::FrameUpload;

const QUEUE_CAPACITY: usize = 64;

/// Outcome of one submitted frame, resolved once it is stored or rejected.
pub struct FrameTicket {
    rx: oneshot::Receiver<Result<FrameInsert>>,
}

impl FrameTicket {
    pub async fn outcome(self) -> Result<FrameInsert> {
        self.rx
            .await
            .map_err(|_| anyhow!("ingest stopped before the frame was stored"))?
    }
}

pub struct IngestController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    sender: Option<mpsc::Sender<FrameJob>>,
    analyzer: Option<Arc<FrameAnalyzer>>,
    pending: Arc<PendingFrames>,
}

impl Default for IngestController {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            sender: None,
            analyzer: None,
            pending: Arc::new(PendingFrames::default()),
        }
    }

    pub fn start(&mut self, analyzer: Arc<FrameAnalyzer>, db: Database) -> Result<()> {
        if self.handle.is_some() {
            bail!("ingest already running");
        }

        let cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(ingest_loop(rx, Arc::clone(&analyzer), db, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.sender = Some(tx);
        self.analyzer = Some(analyzer);
        info!("ingest worker started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Queue a frame. Waits while the queue is full.
    pub async fn submit(&self, upload: FrameUpload) -> Result<FrameTicket> {
        let sender = self.sender.as_ref().context("ingest is not running")?;
        let (reply, rx) = oneshot::channel();
        let ticket = self.pending.track(upload.session_id);
        sender
            .send(FrameJob {
                upload,
                reply,
                ticket,
            })
            .await
            .map_err(|_| anyhow!("ingest queue closed"))?;
        Ok(FrameTicket { rx })
    }

    pub fn in_flight(&self, session_id: i64) -> usize {
        self.pending.in_flight(session_id)
    }

    /// Wait for every accepted frame of the session to be stored, then drop
    /// the session's duplicate-detection state.
    pub async fn drain_session(&self, session_id: i64) {
        self.pending.wait_idle(session_id).await;
        if let Some(analyzer) = &self.analyzer {
            analyzer.forget_session(session_id);
        }
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.sender.take();
        self.analyzer.take();
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("ingest loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

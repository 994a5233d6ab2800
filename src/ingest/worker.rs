use anyhow::{anyhow, Result};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::{mpsc, oneshot, Notify, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::db::{Database, FrameInsert};

use super::analyzer::FrameAnalyzer;
use super::FrameUpload;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// One queued upload and where its outcome goes.
pub struct FrameJob {
    pub upload: FrameUpload,
    pub reply: oneshot::Sender<Result<FrameInsert>>,
    pub ticket: PendingTicket,
}

/// Per-session count of frames accepted but not yet stored.
#[derive(Default)]
pub struct PendingFrames {
    counts: Mutex<HashMap<i64, usize>>,
    idle: Notify,
}

impl PendingFrames {
    pub fn track(self: &Arc<Self>, session_id: i64) -> PendingTicket {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(session_id)
            .or_insert(0) += 1;
        PendingTicket {
            pending: Arc::clone(self),
            session_id,
        }
    }

    pub fn in_flight(&self, session_id: i64) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .copied()
            .unwrap_or(0)
    }

    /// Resolves once no frame of the session is queued or being analysed.
    pub async fn wait_idle(&self, session_id: i64) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight(session_id) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self, session_id: i64) {
        {
            let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(count) = counts.get_mut(&session_id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(&session_id);
                }
            }
        }
        self.idle.notify_waiters();
    }
}

/// Released when the frame is stored, rejected or dropped.
pub struct PendingTicket {
    pending: Arc<PendingFrames>,
    session_id: i64,
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        self.pending.finish(self.session_id);
    }
}

pub async fn ingest_loop(
    mut jobs: mpsc::Receiver<FrameJob>,
    analyzer: Arc<FrameAnalyzer>,
    db: Database,
    cancel_token: CancellationToken,
) {
    let permits = Arc::new(Semaphore::new(analyzer.settings().max_concurrent_analyses.max(1)));
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            job = jobs.recv() => {
                let Some(job) = job else {
                    log_info!("ingest queue closed");
                    break;
                };
                tasks.spawn(process_job(job, Arc::clone(&analyzer), db.clone(), Arc::clone(&permits)));
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(err) = joined {
                    log_error!("frame task failed: {err}");
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("ingest loop shutting down");
                break;
            }
        }
    }

    // Frames already being analysed still get stored; queued ones are
    // dropped and their callers see the queue as closed.
    jobs.close();
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            log_error!("frame task failed: {err}");
        }
    }
}

async fn process_job(
    job: FrameJob,
    analyzer: Arc<FrameAnalyzer>,
    db: Database,
    permits: Arc<Semaphore>,
) {
    let FrameJob {
        upload,
        reply,
        ticket,
    } = job;

    let outcome = match permits.acquire_owned().await {
        Ok(_permit) => analyze_and_store(&upload, &analyzer, &db).await,
        Err(_) => Err(anyhow!("ingest worker closed")),
    };
    if let Err(err) = &outcome {
        log_warn!(
            "frame {} of session {} not stored: {err:#}",
            upload.frame_number,
            upload.session_id
        );
    }
    let _ = reply.send(outcome);
    drop(ticket);
}

async fn analyze_and_store(
    upload: &FrameUpload,
    analyzer: &FrameAnalyzer,
    db: &Database,
) -> Result<FrameInsert> {
    let prepared = analyzer.prepare(upload).await?;
    let record = analyzer.analyze_prepared(upload, &prepared).await;
    db.insert_frame(record, analyzer.settings().max_frames_per_session).await
}

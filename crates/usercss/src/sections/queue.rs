//! Serialized access to a section splitter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::splitter::{SectionSplitter, SplitOutput, SplitRequest};
use crate::{Error, Result};

struct Job {
    request: SplitRequest,
    reply: oneshot::Sender<Result<SplitOutput>>,
}

/// A request queue in front of a [`SectionSplitter`].
///
/// One worker task owns the splitter and handles requests one at a time in
/// FIFO order, so replies can never be attributed to the wrong caller. Each
/// request is bounded by the configured timeout; a hung splitter fails that
/// request with [`Error::SplitterTimeout`] and the worker moves on.
///
/// Cloning the queue shares the worker. The worker stops once every clone is
/// dropped.
#[derive(Clone)]
pub struct SplitterQueue {
    jobs: mpsc::Sender<Job>,
}

impl SplitterQueue {
    /// Spawn the worker task. Must be called from within a Tokio runtime.
    pub fn spawn(
        splitter: Arc<dyn SectionSplitter>,
        timeout: Option<Duration>,
        capacity: usize,
    ) -> Self {
        let (jobs, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_worker(splitter, rx, timeout));
        Self { jobs }
    }
}

async fn run_worker(
    splitter: Arc<dyn SectionSplitter>,
    mut rx: mpsc::Receiver<Job>,
    timeout: Option<Duration>,
) {
    while let Some(Job { request, reply }) = rx.recv().await {
        let style_id = request.style_id;
        tracing::debug!(target: "usercss::sections", ?style_id, "splitting sections");
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, splitter.split(request)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "usercss::sections",
                        ?style_id,
                        ?limit,
                        "section splitter timed out"
                    );
                    Err(Error::SplitterTimeout)
                }
            },
            None => splitter.split(request).await,
        };
        if reply.send(result).is_err() {
            tracing::debug!(target: "usercss::sections", ?style_id, "caller went away before the reply");
        }
    }
    tracing::debug!(target: "usercss::sections", "splitter queue closed");
}

#[async_trait]
impl SectionSplitter for SplitterQueue {
    async fn split(&self, request: SplitRequest) -> Result<SplitOutput> {
        let (reply, response) = oneshot::channel();
        self.jobs
            .send(Job { request, reply })
            .await
            .map_err(|_| Error::SplitterClosed)?;
        response.await.map_err(|_| Error::SplitterClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{MozDocumentSplitter, Section};

    struct Stalled;

    #[async_trait]
    impl SectionSplitter for Stalled {
        async fn split(&self, _request: SplitRequest) -> Result<SplitOutput> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(SplitOutput::default())
        }
    }

    #[tokio::test]
    async fn forwards_to_splitter() {
        let queue = SplitterQueue::spawn(Arc::new(MozDocumentSplitter::new()), None, 4);
        let out = queue.split(SplitRequest::new("a {}", Some(7))).await.unwrap();
        assert_eq!(out.sections, [Section::global("a {}")]);
    }

    #[tokio::test]
    async fn stalled_splitter_times_out() {
        let queue = SplitterQueue::spawn(Arc::new(Stalled), Some(Duration::from_millis(20)), 4);
        let err = queue.split(SplitRequest::new("a {}", None)).await.unwrap_err();
        assert!(matches!(err, Error::SplitterTimeout));
        // the worker survives a timeout
        let err = queue.split(SplitRequest::new("b {}", None)).await.unwrap_err();
        assert!(matches!(err, Error::SplitterTimeout));
    }
}

// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker pool polling the dispatch queue.
//!
//! Each worker claims one message at a time, runs the processor, and maps
//! the outcome onto queue acknowledgement. Workers stop claiming new work
//! when the cancellation token fires and drain the invocation in flight.

use std::sync::Arc;
use std::time::Duration;

use herald_core::{DispatchQueue, HeraldError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::processor::{ProcessOutcome, Processor};

/// A pool of queue-consuming worker tasks.
pub struct WorkerPool {
    queue: Arc<dyn DispatchQueue>,
    processor: Arc<Processor>,
    workers: usize,
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(
        queue: Arc<dyn DispatchQueue>,
        processor: Arc<Processor>,
        workers: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            processor,
            workers,
            poll_interval,
        }
    }

    /// Spawns the worker tasks and returns a handle that resolves when all
    /// of them have stopped.
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        info!(workers = self.workers, "starting dispatch workers");

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let queue = self.queue.clone();
            let processor = self.processor.clone();
            let cancel = cancel.clone();
            let poll_interval = self.poll_interval;

            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, queue, processor, cancel, poll_interval).await;
            }));
        }

        tokio::spawn(async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "worker task panicked");
                }
            }
            info!("all dispatch workers stopped");
        })
    }
}

/// One worker: claim, process, settle, repeat.
async fn worker_loop(
    worker_id: usize,
    queue: Arc<dyn DispatchQueue>,
    processor: Arc<Processor>,
    cancel: CancellationToken,
    poll_interval: Duration,
) {
    debug!(worker_id, "worker started");

    loop {
        let claimed = tokio::select! {
            claimed = queue.dequeue() => claimed,
            _ = cancel.cancelled() => {
                debug!(worker_id, "worker stopping");
                break;
            }
        };

        let message = match claimed {
            Ok(Some(message)) => message,
            Ok(None) => {
                // Queue empty; idle until the next poll or shutdown.
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => continue,
                    _ = cancel.cancelled() => {
                        debug!(worker_id, "worker stopping");
                        break;
                    }
                }
            }
            Err(e) => {
                warn!(worker_id, error = %e, "queue dequeue failed");
                tokio::time::sleep(poll_interval).await;
                continue;
            }
        };

        debug!(
            worker_id,
            request_id = %message.request_id,
            attempts = message.attempts,
            "claimed dispatch message"
        );

        // The in-flight invocation is drained even if cancellation fires
        // while it runs; only claiming new work is gated above.
        let outcome = processor.handle(&message.request_id).await;
        if let Err(e) = settle(&*queue, message.id, outcome).await {
            // The claim's visibility deadline makes the entry reappear.
            warn!(worker_id, message_id = message.id, error = %e, "failed to settle queue message");
        }
    }
}

async fn settle(
    queue: &dyn DispatchQueue,
    message_id: i64,
    outcome: ProcessOutcome,
) -> Result<(), HeraldError> {
    match outcome {
        ProcessOutcome::Completed => queue.ack(message_id).await,
        ProcessOutcome::Retry => queue.fail(message_id).await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use herald_core::{
        Blacklist, DeliveryLog, DeliveryRecord, DispatchMessage, Disposition, Page, PageRequest,
        RequestId, RequestState, RequestStore, SendOutcome, SmsProvider, SmsRequest,
    };

    use super::*;

    /// In-memory queue recording ack/fail calls for assertions.
    #[derive(Default)]
    struct MemoryQueue {
        pending: Mutex<VecDeque<(i64, RequestId)>>,
        acked: Mutex<Vec<i64>>,
        failed: Mutex<Vec<i64>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl DispatchQueue for MemoryQueue {
        async fn publish(&self, id: &RequestId) -> Result<(), HeraldError> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            self.pending.lock().unwrap().push_back((*next, id.clone()));
            Ok(())
        }

        async fn dequeue(&self) -> Result<Option<DispatchMessage>, HeraldError> {
            Ok(self
                .pending
                .lock()
                .unwrap()
                .pop_front()
                .map(|(id, request_id)| DispatchMessage {
                    id,
                    request_id,
                    attempts: 0,
                }))
        }

        async fn ack(&self, message_id: i64) -> Result<(), HeraldError> {
            self.acked.lock().unwrap().push(message_id);
            Ok(())
        }

        async fn fail(&self, message_id: i64) -> Result<(), HeraldError> {
            self.failed.lock().unwrap().push(message_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        requests: Mutex<Vec<SmsRequest>>,
    }

    #[async_trait]
    impl RequestStore for MemoryStore {
        async fn save(&self, request: &SmsRequest) -> Result<(), HeraldError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &RequestId) -> Result<Option<SmsRequest>, HeraldError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| &r.id == id)
                .cloned())
        }

        async fn transition_from_pending(
            &self,
            id: &RequestId,
            disposition: &Disposition,
        ) -> Result<bool, HeraldError> {
            let mut requests = self.requests.lock().unwrap();
            let Some(request) = requests.iter_mut().find(|r| &r.id == id) else {
                return Ok(false);
            };
            if request.state != RequestState::Pending {
                return Ok(false);
            }
            request.state = disposition.state();
            Ok(true)
        }
    }

    struct OpenBlacklist;

    #[async_trait]
    impl Blacklist for OpenBlacklist {
        async fn add(&self, _recipients: &[String]) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn remove(&self, _recipients: &[String]) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn is_suppressed(&self, _recipient: &str) -> Result<bool, HeraldError> {
            Ok(false)
        }
        async fn list(&self) -> Result<Vec<String>, HeraldError> {
            Ok(Vec::new())
        }
    }

    struct AlwaysSends;

    #[async_trait]
    impl SmsProvider for AlwaysSends {
        async fn send(
            &self,
            _recipient: &str,
            _correlation_id: &RequestId,
            _body: &str,
        ) -> SendOutcome {
            SendOutcome::Success
        }
    }

    struct NullLog;

    #[async_trait]
    impl DeliveryLog for NullLog {
        async fn record(&self, _record: &DeliveryRecord) -> Result<(), HeraldError> {
            Ok(())
        }
        async fn find_by_recipient(
            &self,
            _recipient: &str,
            _from: &str,
            _to: &str,
            page: PageRequest,
        ) -> Result<Page<DeliveryRecord>, HeraldError> {
            Ok(Page::new(Vec::new(), page, 0))
        }
        async fn search(
            &self,
            _phrase: &str,
            page: PageRequest,
        ) -> Result<Page<DeliveryRecord>, HeraldError> {
            Ok(Page::new(Vec::new(), page, 0))
        }
    }

    #[tokio::test]
    async fn workers_drain_queue_and_ack() {
        let queue = Arc::new(MemoryQueue::default());
        let store = Arc::new(MemoryStore::default());

        let mut ids = Vec::new();
        for _ in 0..5 {
            let request = SmsRequest::new("+919876543210", "hi");
            ids.push(request.id.clone());
            store.save(&request).await.unwrap();
            queue.publish(&request.id).await.unwrap();
        }

        let processor = Arc::new(Processor::new(
            store.clone(),
            Arc::new(OpenBlacklist),
            Arc::new(AlwaysSends),
            Arc::new(NullLog),
        ));

        let cancel = CancellationToken::new();
        let pool = WorkerPool::new(queue.clone(), processor, 2, Duration::from_millis(10));
        let handle = pool.start(cancel.clone());

        // Wait for the queue to drain.
        for _ in 0..100 {
            if queue.acked.lock().unwrap().len() == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(queue.acked.lock().unwrap().len(), 5);
        assert!(queue.failed.lock().unwrap().is_empty());
        for id in &ids {
            let request = store.find_by_id(id).await.unwrap().unwrap();
            assert_eq!(request.state, RequestState::Sent);
        }
    }

    #[tokio::test]
    async fn cancelled_pool_stops_idle_workers_promptly() {
        let queue = Arc::new(MemoryQueue::default());
        let processor = Arc::new(Processor::new(
            Arc::new(MemoryStore::default()),
            Arc::new(OpenBlacklist),
            Arc::new(AlwaysSends),
            Arc::new(NullLog),
        ));

        let cancel = CancellationToken::new();
        let pool = WorkerPool::new(queue, processor, 4, Duration::from_secs(60));
        let handle = pool.start(cancel.clone());

        cancel.cancel();
        // Workers idle on a 60s poll must still exit quickly via the token.
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("workers should stop on cancellation")
            .unwrap();
    }
}

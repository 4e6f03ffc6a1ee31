//! Worker pools for the external reconcile domains.
//!
//! Each domain gets a pool of `workers_number[domain]` tokio tasks draining
//! one bounded channel. The pools are the concurrent callers of admission,
//! retention and GC scheduling.

use std::sync::Arc;

use async_trait::async_trait;
use runwarden_config::{ConfigSnapshot, WorkerDomain, WorkersNumber};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::CoreError;

/// Queue slots per worker.
const QUEUE_PER_WORKER: usize = 64;

/// Processes one event of a reconcile domain.
#[async_trait]
pub trait EventHandler<E>: Send + Sync + 'static {
    async fn handle(&self, event: E);
}

/// Resolves pool sizes from the config snapshot and starts pools.
#[derive(Debug, Clone)]
pub struct WorkerPoolManager {
    sizes: WorkersNumber,
}

impl WorkerPoolManager {
    pub fn new(config: &ConfigSnapshot) -> Self {
        Self {
            sizes: config.workers(),
        }
    }

    /// Never zero once the snapshot went through defaulting.
    pub fn size(&self, domain: WorkerDomain) -> usize {
        self.sizes.get(domain).max(1) as usize
    }

    pub fn sizes(&self) -> Vec<(WorkerDomain, usize)> {
        WorkerDomain::ALL
            .iter()
            .map(|d| (*d, self.size(*d)))
            .collect()
    }

    /// Start the pool of `domain`; workers stop when `token` is cancelled
    /// or the pool is joined.
    pub fn spawn<E, H>(&self, domain: WorkerDomain, handler: Arc<H>, token: CancellationToken) -> WorkerPool<E>
    where
        E: Send + 'static,
        H: EventHandler<E>,
    {
        WorkerPool::start(domain, self.size(domain), handler, token)
    }
}

/// Running pool of one domain.
pub struct WorkerPool<E> {
    domain: WorkerDomain,
    tx: mpsc::Sender<E>,
    workers: Vec<JoinHandle<()>>,
}

impl<E: Send + 'static> WorkerPool<E> {
    fn start<H>(domain: WorkerDomain, size: usize, handler: Arc<H>, token: CancellationToken) -> Self
    where
        H: EventHandler<E>,
    {
        let size = size.max(1);
        let (tx, rx) = mpsc::channel::<E>(size * QUEUE_PER_WORKER);
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..size)
            .map(|idx| {
                let rx = Arc::clone(&rx);
                let handler = Arc::clone(&handler);
                let token = token.clone();
                tokio::spawn(async move {
                    loop {
                        let next = {
                            let mut rx = rx.lock().await;
                            tokio::select! {
                                _ = token.cancelled() => None,
                                event = rx.recv() => event,
                            }
                        };
                        let Some(event) = next else {
                            break;
                        };
                        handler.handle(event).await;
                    }
                    trace!(domain = domain.as_str(), worker = idx, "worker stopped");
                })
            })
            .collect();

        debug!(domain = domain.as_str(), size, "worker pool started");
        Self { domain, tx, workers }
    }

    pub fn domain(&self) -> WorkerDomain {
        self.domain
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue, waiting for room.
    pub async fn dispatch(&self, event: E) -> Result<(), CoreError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| CoreError::PoolClosed(self.domain.as_str()))
    }

    /// Enqueue without waiting.
    pub fn try_dispatch(&self, event: E) -> Result<(), CoreError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CoreError::PoolFull(self.domain.as_str()),
            mpsc::error::TrySendError::Closed(_) => CoreError::PoolClosed(self.domain.as_str()),
        })
    }

    /// Close the queue and wait for workers to drain it.
    pub async fn join(self) {
        let Self { domain, tx, workers } = self;
        drop(tx);
        for worker in workers {
            let _ = worker.await;
        }
        debug!(domain = domain.as_str(), "worker pool joined");
    }
}

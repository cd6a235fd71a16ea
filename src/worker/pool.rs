// ABOUTME: Implements the WorkerPool - a thread-safe container for the workers
// ABOUTME: available to the coordinator, in registration order.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::Worker;

/// A thread-safe pool of workers.
///
/// Registration order is preserved: the balancer breaks load ties in favor
/// of the earliest-registered worker, so the pool keeps its workers in a
/// `Vec` rather than a map.
#[derive(Default)]
pub struct WorkerPool {
    workers: Arc<RwLock<Vec<Arc<dyn Worker>>>>,
}

impl WorkerPool {
    /// Create a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker.
    pub async fn register<W: Worker + 'static>(&self, worker: W) {
        self.register_arc(Arc::new(worker)).await;
    }

    /// Register a worker from an Arc.
    ///
    /// A worker with an already-registered name replaces the original in
    /// place, keeping its position in registration order.
    pub async fn register_arc(&self, worker: Arc<dyn Worker>) {
        let mut workers = self.workers.write().await;
        if let Some(slot) = workers.iter_mut().find(|w| w.name() == worker.name()) {
            *slot = worker;
        } else {
            workers.push(worker);
        }
    }

    /// Get a worker by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Worker>> {
        let workers = self.workers.read().await;
        workers.iter().find(|w| w.name() == name).cloned()
    }

    /// List all worker names, in registration order.
    pub async fn names(&self) -> Vec<String> {
        let workers = self.workers.read().await;
        workers.iter().map(|w| w.name().to_string()).collect()
    }

    /// Get all registered workers, in registration order.
    pub async fn all(&self) -> Vec<Arc<dyn Worker>> {
        let workers = self.workers.read().await;
        workers.clone()
    }

    /// Get the number of registered workers.
    pub async fn count(&self) -> usize {
        let workers = self.workers.read().await;
        workers.len()
    }
}

impl Clone for WorkerPool {
    fn clone(&self) -> Self {
        Self {
            workers: Arc::clone(&self.workers),
        }
    }
}

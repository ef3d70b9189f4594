//! # Pool de Workers
//! src/jobs/pool.rs
//!
//! Conjunto fijo de threads que drenan una [`JobQueue`] y ejecutan el
//! handler sobre cada job.
//!
//! - El lock de la cola se suelta antes de llamar al handler, así un
//!   request lento no bloquea el encolado de los demás.
//! - Un panic dentro del handler se captura: el job se cuenta como fallido
//!   y el worker sigue vivo.
//! - `shutdown()` cierra la cola, deja que se atiendan los jobs ya
//!   encolados y hace join de todos los workers.

use super::queue::{JobQueue, QueueError};
use log::{debug, error, info};
use serde::Serialize;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Función que procesa un job
pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Errores de inicialización del pool
#[derive(Debug)]
pub enum PoolError {
    /// Se pidió un pool sin workers
    InvalidSize,

    /// Se pidió una cola sin capacidad
    InvalidCapacity,

    /// El sistema operativo no pudo crear un thread
    Spawn(io::Error),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::InvalidSize => write!(f, "Thread pool needs at least one worker"),
            PoolError::InvalidCapacity => write!(f, "Job queue capacity must be at least 1"),
            PoolError::Spawn(e) => write!(f, "Failed to spawn worker thread: {}", e),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Contadores compartidos entre el pool y sus workers
#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
}

/// Estadísticas del pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub submitted: u64,
    /// Jobs cuyo handler terminó normalmente
    pub completed: u64,
    /// Jobs cuyo handler hizo panic
    pub panicked: u64,
    pub pending: usize,
}

/// Pool fijo de workers
pub struct ThreadPool<T: Send + 'static> {
    queue: JobQueue<T>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl<T: Send + 'static> ThreadPool<T> {
    /// Crea la cola y lanza `size` workers.
    ///
    /// # Errores
    ///
    /// `InvalidSize`/`InvalidCapacity` para parámetros en cero y `Spawn` si
    /// falla la creación de algún thread (los ya creados se detienen).
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::jobs::ThreadPool;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let total = Arc::new(AtomicUsize::new(0));
    /// let pool = {
    ///     let total = Arc::clone(&total);
    ///     ThreadPool::new(2, 8, move |n: usize| {
    ///         total.fetch_add(n, Ordering::SeqCst);
    ///     })
    ///     .unwrap()
    /// };
    ///
    /// for n in 1..=4 {
    ///     pool.submit(n).unwrap();
    /// }
    /// pool.shutdown();
    /// assert_eq!(total.load(Ordering::SeqCst), 10);
    /// ```
    pub fn new<F>(size: usize, capacity: usize, handler: F) -> Result<Self, PoolError>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        if size == 0 {
            return Err(PoolError::InvalidSize);
        }
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity);
        }

        let handler: Handler<T> = Arc::new(handler);
        let mut pool = Self {
            queue: JobQueue::new(capacity),
            workers: Vec::with_capacity(size),
            counters: Arc::new(Counters::default()),
        };

        for id in 0..size {
            let queue = pool.queue.clone();
            let handler = Arc::clone(&handler);
            let counters = Arc::clone(&pool.counters);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, queue, handler, counters));

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    error!("No se pudo crear worker-{}: {}", id, e);
                    // Drop cierra la cola y hace join de los ya creados
                    drop(pool);
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        info!("Thread pool iniciado: {} workers, cola de {}", size, capacity);
        Ok(pool)
    }

    /// Encola un job; bloquea si la cola está llena
    pub fn submit(&self, job: T) -> Result<(), QueueError<T>> {
        self.count_submission(|queue| queue.push(job))
    }

    /// Encola sin bloquear; `Full` si no hay espacio
    pub fn try_submit(&self, job: T) -> Result<(), QueueError<T>> {
        self.count_submission(|queue| queue.try_push(job))
    }

    /// Cuenta el job antes de encolarlo; si no entra se descuenta.
    fn count_submission<F>(&self, push: F) -> Result<(), QueueError<T>>
    where
        F: FnOnce(&JobQueue<T>) -> Result<(), QueueError<T>>,
    {
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        push(&self.queue).inspect_err(|_| {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.workers.len(),
            // Terminados antes que enviados: completed + panicked <= submitted
            completed: self.counters.completed.load(Ordering::SeqCst),
            panicked: self.counters.panicked.load(Ordering::SeqCst),
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            pending: self.queue.len(),
        }
    }

    /// Cierra la cola, espera a que se atiendan los jobs pendientes y
    /// hace join de todos los workers.
    pub fn shutdown(mut self) -> PoolStats {
        self.stop();
        self.stats()
    }

    fn stop(&mut self) {
        self.queue.close();
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!("{} terminó con panic", name);
            }
        }
    }
}

impl<T: Send + 'static> Drop for ThreadPool<T> {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop();
        }
    }
}

fn worker_loop<T>(id: usize, queue: JobQueue<T>, handler: Handler<T>, counters: Arc<Counters>) {
    debug!("worker-{} started", id);

    // pop() suelta el lock antes de retornar
    while let Some(job) = queue.pop() {
        match panic::catch_unwind(AssertUnwindSafe(|| handler(job))) {
            Ok(()) => {
                counters.completed.fetch_add(1, Ordering::SeqCst);
            }
            Err(payload) => {
                counters.panicked.fetch_add(1, Ordering::SeqCst);
                error!("worker-{}: job abortado por panic: {}", id, panic_message(&*payload));
            }
        }
    }

    debug!("worker-{} stopped", id);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::{mpsc, Barrier, Mutex};
    use std::time::{Duration, Instant};

    #[test]
    fn test_rejects_zero_workers() {
        let result = ThreadPool::new(0, 4, |_: u32| {});
        assert!(matches!(result, Err(PoolError::InvalidSize)));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = ThreadPool::new(2, 0, |_: u32| {});
        assert!(matches!(result, Err(PoolError::InvalidCapacity)));
    }

    #[test]
    fn test_every_job_handled_exactly_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pool = {
            let seen = Arc::clone(&seen);
            ThreadPool::new(4, 16, move |job: u32| {
                seen.lock().unwrap().push(job);
            })
            .unwrap()
        };
        let pool = Arc::new(pool);

        let producers: Vec<_> = (0..4u32)
            .map(|p| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..250u32 {
                        pool.submit(p * 1000 + i).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let pool = Arc::try_unwrap(pool).ok().expect("producers still hold the pool");
        let stats = pool.shutdown();

        let seen = seen.lock().unwrap();
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(seen.len(), 1000);
        assert_eq!(unique.len(), 1000);
        assert_eq!(stats.submitted, 1000);
        assert_eq!(stats.completed, 1000);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_single_worker_preserves_fifo() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pool = {
            let seen = Arc::clone(&seen);
            ThreadPool::new(1, 64, move |job: u32| seen.lock().unwrap().push(job)).unwrap()
        };

        for i in 0..50 {
            pool.submit(i).unwrap();
        }
        pool.shutdown();

        assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_handlers_run_in_parallel() {
        // Los 4 handlers deben estar dentro a la vez para pasar la barrera
        let barrier = Arc::new(Barrier::new(4));
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let pool = {
            let barrier = Arc::clone(&barrier);
            ThreadPool::new(4, 4, move |job: u32| {
                barrier.wait();
                tx.lock().unwrap().send(job).unwrap();
            })
            .unwrap()
        };

        for i in 0..4 {
            pool.submit(i).unwrap();
        }
        for _ in 0..4 {
            rx.recv_timeout(Duration::from_secs(5)).expect("handlers did not overlap");
        }
        pool.shutdown();
    }

    #[test]
    fn test_panic_does_not_shrink_pool() {
        let handled = Arc::new(AtomicUsize::new(0));
        let pool = {
            let handled = Arc::clone(&handled);
            ThreadPool::new(2, 16, move |job: u32| {
                if job % 2 == 0 {
                    panic!("bad job {}", job);
                }
                handled.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        };

        for i in 0..20 {
            pool.submit(i).unwrap();
        }
        let stats = pool.shutdown();

        assert_eq!(handled.load(Ordering::SeqCst), 10);
        assert_eq!(stats.panicked, 10);
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.workers, 2);
    }

    #[test]
    fn test_shutdown_serves_pending_jobs() {
        let handled = Arc::new(AtomicUsize::new(0));
        let pool = {
            let handled = Arc::clone(&handled);
            ThreadPool::new(2, 64, move |_: u32| {
                thread::sleep(Duration::from_millis(5));
                handled.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        };

        for i in 0..40 {
            pool.submit(i).unwrap();
        }
        let stats = pool.shutdown();

        assert_eq!(handled.load(Ordering::SeqCst), 40);
        assert_eq!(stats.completed, 40);
    }

    #[test]
    fn test_idle_workers_stop_quickly() {
        let pool = ThreadPool::new(8, 8, |_: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        let stats = pool.shutdown();
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(stats.submitted, 0);
    }

    #[test]
    fn test_try_submit_reports_full() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let (started_tx, started_rx) = mpsc::channel();
        let started_tx = Mutex::new(started_tx);

        let pool = ThreadPool::new(1, 1, move |_: u32| {
            started_tx.lock().unwrap().send(()).unwrap();
            let _ = release_rx.lock().unwrap().recv();
        })
        .unwrap();

        // Job 0 ocupa al worker, job 1 llena la cola
        pool.submit(0).unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        pool.submit(1).unwrap();
        assert!(matches!(pool.try_submit(2), Err(QueueError::Full(2))));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        let stats = pool.shutdown();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.completed, 2);
    }

    #[test]
    fn test_live_stats_never_show_more_finished_than_submitted() {
        let pool = Arc::new(ThreadPool::new(4, 8, |n: u32| {
            if n % 50 == 0 {
                panic!("job {}", n);
            }
        })
        .unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let observer = {
            let pool = Arc::clone(&pool);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut samples = 0;
                while !done.load(Ordering::SeqCst) {
                    let stats = pool.stats();
                    assert!(
                        stats.completed + stats.panicked <= stats.submitted,
                        "inconsistent stats: {:?}",
                        stats
                    );
                    samples += 1;
                }
                samples
            })
        };

        for n in 1..=2_000 {
            pool.submit(n).unwrap();
        }
        done.store(true, Ordering::SeqCst);
        assert!(observer.join().unwrap() > 0);

        let pool = Arc::try_unwrap(pool).ok().unwrap();
        let stats = pool.shutdown();
        assert_eq!(stats.submitted, 2_000);
        assert_eq!(stats.completed + stats.panicked, 2_000);
        assert_eq!(stats.panicked, 40);
    }
}

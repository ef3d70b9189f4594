//! # Cola de Jobs
//! src/jobs/queue.rs
//!
//! Cola FIFO acotada y thread-safe que conecta al acceptor (productor) con
//! los workers del pool (consumidores).
//!
//! - Un solo `Mutex` protege la cola y su contador; el contador es el
//!   largo del `VecDeque`, así que siempre coinciden.
//! - `not_empty` despierta a un worker cuando llega un job.
//! - `not_full` despierta a un productor bloqueado cuando se libera espacio.
//! - `close()` es la señal de cancelación: los productores reciben su job
//!   de vuelta y los consumidores drenan lo pendiente antes de terminar.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Error al encolar. El job siempre se devuelve al llamador.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError<T> {
    /// La cola alcanzó su capacidad (solo `try_push`)
    Full(T),

    /// La cola fue cerrada
    Closed(T),
}

impl<T> QueueError<T> {
    /// Recupera el job que no se pudo encolar
    pub fn into_inner(self) -> T {
        match self {
            QueueError::Full(job) | QueueError::Closed(job) => job,
        }
    }
}

impl<T> std::fmt::Display for QueueError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Full(_) => write!(f, "Job queue is full"),
            QueueError::Closed(_) => write!(f, "Job queue is closed"),
        }
    }
}

impl<T: std::fmt::Debug> std::error::Error for QueueError<T> {}

struct State<T> {
    jobs: VecDeque<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

/// Cola FIFO acotada. Clonarla comparte la misma cola.
pub struct JobQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> JobQueue<T> {
    /// Crea una cola con capacidad máxima `capacity` (mínimo 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    jobs: VecDeque::with_capacity(capacity.min(1024)),
                    closed: false,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        }
    }

    /// Un panic en otro thread no debe dejar la cola inutilizable
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Encola al final. Bloquea mientras la cola esté llena.
    ///
    /// Despierta como máximo a un consumidor.
    pub fn push(&self, job: T) -> Result<(), QueueError<T>> {
        let mut state = self.lock();

        while !state.closed && state.jobs.len() >= self.shared.capacity {
            state = self
                .shared
                .not_full
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        if state.closed {
            return Err(QueueError::Closed(job));
        }

        state.jobs.push_back(job);
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Encola sin bloquear; `Full` si no hay espacio
    pub fn try_push(&self, job: T) -> Result<(), QueueError<T>> {
        let mut state = self.lock();

        if state.closed {
            return Err(QueueError::Closed(job));
        }
        if state.jobs.len() >= self.shared.capacity {
            return Err(QueueError::Full(job));
        }

        state.jobs.push_back(job);
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Desencola el job más antiguo. Bloquea mientras la cola esté vacía.
    ///
    /// Retorna `None` solo cuando la cola está cerrada y ya no quedan jobs.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();

        loop {
            if let Some(job) = state.jobs.pop_front() {
                drop(state);
                self.shared.not_full.notify_one();
                return Some(job);
            }

            if state.closed {
                return None;
            }

            // Puede despertar sin motivo: el loop vuelve a revisar
            state = self
                .shared
                .not_empty
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Desencola sin bloquear
    pub fn try_pop(&self) -> Option<T> {
        let job = self.lock().jobs.pop_front();
        if job.is_some() {
            self.shared.not_full.notify_one();
        }
        job
    }

    /// Cierra la cola y despierta a todos los que estén esperando
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Jobs pendientes
    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.shared.capacity
    }
}

impl<T> Clone for JobQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

//! # Sistema de Jobs
//!
//! Productor/consumidor entre el acceptor y los workers:
//!
//! - `queue`: cola FIFO acotada con `Mutex` + `Condvar`
//! - `pool`: threads fijos que drenan la cola y ejecutan el handler
//!
//! Un job es una conexión aceptada; se encola una vez, se desencola una
//! sola vez y pertenece al worker que lo sacó hasta que cierra la conexión.

pub mod pool;
pub mod queue;

pub use pool::{PoolError, PoolStats, ThreadPool};
pub use queue::{JobQueue, QueueError};

//! # Módulo de Métricas
//!
//! Contadores por código de estado, latencias y bytes enviados.

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};

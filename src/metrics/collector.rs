//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta contadores por código de estado y latencias de los requests
//! atendidos. El servidor lo vuelca como JSON al apagarse.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
pub struct MetricsCollector {
    inner: Mutex<MetricsData>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Contador total de requests
    total_requests: u64,

    /// Requests por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Suma de latencias (microsegundos)
    latency_sum_us: u128,

    /// Latencia máxima observada (microsegundos)
    latency_max_us: u64,

    /// Bytes de body enviados
    bytes_sent: u64,
}

/// Foto de las métricas en un instante
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub bytes_sent: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsData::default()),
            start_time: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsData> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registra un request atendido
    pub fn record_request(&self, status_code: u16, latency: Duration, bytes_sent: usize) {
        let latency_us = latency.as_micros().min(u64::MAX as u128) as u64;
        let mut data = self.lock();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        data.latency_sum_us += latency_us as u128;
        data.latency_max_us = data.latency_max_us.max(latency_us);
        data.bytes_sent += bytes_sent as u64;
    }

    pub fn total_requests(&self) -> u64 {
        self.lock().total_requests
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.lock();

        let avg_latency_ms = if data.total_requests == 0 {
            0.0
        } else {
            data.latency_sum_us as f64 / data.total_requests as f64 / 1000.0
        };

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            status_codes: data.status_codes.clone(),
            avg_latency_ms,
            max_latency_ms: data.latency_max_us as f64 / 1000.0,
            bytes_sent: data.bytes_sent,
        }
    }

    /// Métricas actuales en formato JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

//! Host memory reporting
//!
//! Logged at every checkpoint so long runs can be watched for growth.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Host memory at one point in time, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl MemorySnapshot {
    /// Reads current memory figures from the OS
    pub fn capture() -> Self {
        let mut sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        sys.refresh_memory();
        Self {
            total: sys.total_memory(),
            used: sys.used_memory(),
            available: sys.available_memory(),
        }
    }

    pub fn total_gib(&self) -> f64 {
        self.total as f64 / BYTES_PER_GIB
    }

    pub fn used_gib(&self) -> f64 {
        self.used as f64 / BYTES_PER_GIB
    }

    pub fn available_gib(&self) -> f64 {
        self.available as f64 / BYTES_PER_GIB
    }

    /// Share of total memory in use, 0.0 when the total is unknown
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }
}

/// Captures and logs a memory snapshot
pub fn log_memory_usage() -> MemorySnapshot {
    let snapshot = MemorySnapshot::capture();
    tracing::info!(
        "Memory: total {:.2} GiB, used {:.2} GiB ({:.1}%), available {:.2} GiB",
        snapshot.total_gib(),
        snapshot.used_gib(),
        snapshot.used_percent(),
        snapshot.available_gib()
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gib_conversion() {
        let snapshot = MemorySnapshot {
            total: 8 * 1024 * 1024 * 1024,
            used: 2 * 1024 * 1024 * 1024,
            available: 6 * 1024 * 1024 * 1024,
        };
        assert!((snapshot.total_gib() - 8.0).abs() < f64::EPSILON);
        assert!((snapshot.available_gib() - 6.0).abs() < f64::EPSILON);
        assert!((snapshot.used_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_total() {
        let snapshot = MemorySnapshot {
            total: 0,
            used: 0,
            available: 0,
        };
        assert_eq!(snapshot.used_percent(), 0.0);
    }
}

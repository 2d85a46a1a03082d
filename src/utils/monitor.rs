use crate::domain::ports::StatsRecorder;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub registrations_total: u64,
    pub failed_registrations_total: u64,
    pub deregistered_total: u64,
    pub checks_total: u64,
    pub last_check_duration_ms: u64,
    pub last_check_timestamp: i64,
    pub last_alive_timestamp: i64,
}

/// 註冊狀態的計數器。每個欄位只有一個 writer，讀取端隨時可以 snapshot。
#[derive(Debug, Default)]
pub struct RegistrationStats {
    registrations_total: AtomicU64,
    failed_registrations_total: AtomicU64,
    deregistered_total: AtomicU64,
    checks_total: AtomicU64,
    last_check_duration_ms: AtomicU64,
    last_check_timestamp: AtomicI64,
    last_alive_timestamp: AtomicI64,
}

impl RegistrationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            registrations_total: self.registrations_total.load(Ordering::Relaxed),
            failed_registrations_total: self.failed_registrations_total.load(Ordering::Relaxed),
            deregistered_total: self.deregistered_total.load(Ordering::Relaxed),
            checks_total: self.checks_total.load(Ordering::Relaxed),
            last_check_duration_ms: self.last_check_duration_ms.load(Ordering::Relaxed),
            last_check_timestamp: self.last_check_timestamp.load(Ordering::Relaxed),
            last_alive_timestamp: self.last_alive_timestamp.load(Ordering::Relaxed),
        }
    }

    pub fn log_final_stats(&self) {
        let stats = self.snapshot();
        tracing::info!(
            "📊 Final Stats - Checks: {}, Re-registrations after loss: {}, Registrations: {} ({} failed)",
            stats.checks_total,
            stats.deregistered_total,
            stats.registrations_total,
            stats.failed_registrations_total
        );
    }
}

impl StatsRecorder for RegistrationStats {
    fn record_registration(&self, success: bool) {
        if success {
            self.registrations_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_registrations_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_deregistered(&self) {
        self.deregistered_total.fetch_add(1, Ordering::Relaxed);
    }

    fn record_check(&self, duration: Duration) {
        self.checks_total.fetch_add(1, Ordering::Relaxed);
        self.last_check_duration_ms
            .store(duration.as_millis() as u64, Ordering::Relaxed);
        self.last_check_timestamp
            .store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    fn record_alive(&self, unix_seconds: i64) {
        self.last_alive_timestamp.store(unix_seconds, Ordering::Relaxed);
    }
}

/// 每個 period 寫一次 last-alive 時間戳，和 reconciler 之間只共用 recorder
pub struct AliveSignal {
    period: Duration,
}

impl AliveSignal {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn spawn(
        self,
        recorder: Arc<dyn StatsRecorder>,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                recorder.record_alive(chrono::Utc::now().timestamp());
                tokio::select! {
                    _ = tokio::time::sleep(self.period) => {}
                    _ = shutdown.changed() => return,
                }
            }
        })
    }
}

impl Default for AliveSignal {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

use crate::domain::model::Registration;
use crate::domain::ports::{ServiceRegistry, StatsRecorder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Registering,
    Steady,
    Checking,
    ReRegistering,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 明確停止，不做 deregister
    Stop,
    /// process 結束，先 deregister 一次再停
    ProcessShutdown,
}

/// 持有註冊生命週期的背景 loop：先註冊，之後每個 interval 查一次，查不到就重新註冊。
///
/// 同一個 reconciler 的 registry 呼叫嚴格依序，任何時刻最多一個請求在途。
pub struct Reconciler<R: ServiceRegistry + 'static> {
    registry: Arc<R>,
    registration: Registration,
    interval: Duration,
    stats: Arc<dyn StatsRecorder>,
}

pub struct ReconcilerHandle {
    signal: watch::Sender<Option<StopReason>>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// 停止 loop，不通知 registry
    pub async fn stop(self) {
        self.finish(StopReason::Stop).await;
    }

    /// process 結束時呼叫，會做一次 best-effort deregister
    pub async fn shutdown(self) {
        self.finish(StopReason::ProcessShutdown).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    async fn finish(self, reason: StopReason) {
        // task 已結束時 receiver 不存在，send 失敗可以忽略
        let _ = self.signal.send(Some(reason));
        if let Err(e) = self.task.await {
            tracing::error!("❌ Registration reconciler terminated abnormally: {}", e);
        }
    }
}

impl<R: ServiceRegistry + 'static> Reconciler<R> {
    pub fn new(
        registry: Arc<R>,
        registration: Registration,
        interval: Duration,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        Self {
            registry,
            registration,
            interval,
            stats,
        }
    }

    pub fn spawn(self) -> ReconcilerHandle {
        let (signal, receiver) = watch::channel(None);
        let task = tokio::spawn(self.run(receiver));
        ReconcilerHandle { signal, task }
    }

    async fn run(self, mut signal: watch::Receiver<Option<StopReason>>) {
        let id = self.registration.id.clone();
        let mut state = ReconcilerState::Registering;

        loop {
            tracing::trace!("Reconciler {} state: {:?}", id, state);
            state = match state {
                ReconcilerState::Registering => {
                    let ok = self.register().await;
                    if ok {
                        tracing::info!(
                            "✅ Registered service {} ({}) at {}:{}",
                            self.registration.name,
                            id,
                            self.registration.address,
                            self.registration.port
                        );
                    } else {
                        tracing::warn!(
                            "⚠️ Initial registration of {} failed, retrying in {:?}",
                            id,
                            self.interval
                        );
                    }
                    ReconcilerState::Steady
                }
                ReconcilerState::Steady => {
                    let pending = *signal.borrow_and_update();
                    if let Some(reason) = pending {
                        self.stop(reason).await;
                        return;
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => ReconcilerState::Checking,
                        changed = signal.changed() => {
                            let reason = match changed {
                                Ok(()) => (*signal.borrow_and_update()).unwrap_or(StopReason::Stop),
                                Err(_) => StopReason::Stop,
                            };
                            self.stop(reason).await;
                            ReconcilerState::Stopped
                        }
                    }
                }
                ReconcilerState::Checking => {
                    let start = Instant::now();
                    let registered = self.registry.is_registered(&id).await;
                    self.stats.record_check(start.elapsed());
                    // 檢查途中收到的 stop/shutdown 優先，不再進入下一輪 HTTP
                    let pending = *signal.borrow_and_update();
                    if let Some(reason) = pending {
                        self.stop(reason).await;
                        return;
                    }
                    if registered {
                        tracing::debug!("Service {} still registered", id);
                        ReconcilerState::Steady
                    } else {
                        ReconcilerState::ReRegistering
                    }
                }
                ReconcilerState::ReRegistering => {
                    self.stats.record_deregistered();
                    let ok = self.register().await;
                    tracing::warn!("🔁 Service {} was not registered, tried to reregister: {}", id, ok);
                    ReconcilerState::Steady
                }
                ReconcilerState::Stopped => return,
            };
        }
    }

    async fn register(&self) -> bool {
        let ok = self.registry.register(&self.registration).await;
        self.stats.record_registration(ok);
        ok
    }

    async fn stop(&self, reason: StopReason) {
        if reason == StopReason::ProcessShutdown {
            let ok = self.registry.deregister(&self.registration.id).await;
            tracing::info!("👋 Deregistered service {}: {}", self.registration.id, ok);
        }
        tracing::debug!("Reconciler {} stopped ({:?})", self.registration.id, reason);
    }
}

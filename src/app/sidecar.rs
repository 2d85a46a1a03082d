use crate::adapters::consul::ConsulClient;
use crate::adapters::health::run_health_server;
use crate::app::supervisor::wait_for_exit;
use crate::config::ServiceConfig;
use crate::core::identity::{build_registration, new_registration_id};
use crate::core::reconciler::{Reconciler, ReconcilerHandle, DEFAULT_CHECK_INTERVAL};
use crate::core::template::IdentityTemplateResolver;
use crate::domain::model::Registration;
use crate::utils::error::{Result, SidecarError};
use crate::utils::monitor::{AliveSignal, RegistrationStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct SidecarOptions {
    /// 空字串代表所有介面
    pub host: String,
    pub fixed_port: Option<u16>,
    pub check_interval: Duration,
}

impl Default for SidecarOptions {
    fn default() -> Self {
        Self {
            host: String::new(),
            fixed_port: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

/// 啟動後的 sidecar：health endpoint、alive signal 與 reconciler
pub struct Sidecar {
    port: u16,
    registration: Option<Registration>,
    stats: Arc<RegistrationStats>,
    shutdown: watch::Sender<bool>,
    reconciler: Option<ReconcilerHandle>,
    health: JoinHandle<Result<()>>,
    alive: Option<JoinHandle<()>>,
}

impl Sidecar {
    /// 綁定 port 並啟動背景工作，必須在 tokio runtime 內呼叫。
    ///
    /// 設定錯誤與找不到可用 port 都會回傳錯誤，registry 連不上則不會。
    pub fn start(
        config: &ServiceConfig,
        options: &SidecarOptions,
        resolver: &IdentityTemplateResolver,
    ) -> Result<Self> {
        let tags = config.resolved_tags(resolver);
        let bound = config
            .port_allocator(&options.host, options.fixed_port)?
            .allocate()?;
        let port = bound.port();
        let stats = Arc::new(RegistrationStats::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        if !config.enabled {
            tracing::info!("Consul registration disabled, holding port {}", port);
            let health = tokio::spawn(run_health_server(bound.listener, None, shutdown_rx));
            return Ok(Self {
                port,
                registration: None,
                stats,
                shutdown,
                reconciler: None,
                health,
                alive: None,
            });
        }

        let address = config
            .registry_address
            .clone()
            .ok_or_else(|| SidecarError::MissingConfigError {
                field: "address".to_string(),
            })?;
        let client = Arc::new(ConsulClient::new(address)?);

        let registration = build_registration(new_registration_id(), config, &bound, tags);
        tracing::debug!("Registration: {:?}", registration);

        let health = tokio::spawn(run_health_server(
            bound.listener,
            Some(registration.id.clone()),
            shutdown_rx.clone(),
        ));
        let alive = AliveSignal::default().spawn(stats.clone(), shutdown_rx);
        let reconciler = Reconciler::new(
            client,
            registration.clone(),
            options.check_interval,
            stats.clone(),
        )
        .spawn();

        Ok(Self {
            port,
            registration: Some(registration),
            stats,
            shutdown,
            reconciler: Some(reconciler),
            health,
            alive: Some(alive),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    pub fn stats(&self) -> Arc<RegistrationStats> {
        self.stats.clone()
    }

    /// 等監控的 process（或 Ctrl-C / SIGTERM）結束後 shutdown。
    ///
    /// 子命令無法啟動或等待失敗時一樣會先 shutdown，再把錯誤往上傳。
    pub async fn run_until_exit(self, command: &[String]) -> Result<i32> {
        let outcome = wait_for_exit(command).await;
        if let Err(e) = &outcome {
            tracing::error!("❌ Monitored process failed: {}", e);
        }

        tracing::info!("Shutting down");
        self.shutdown().await;
        outcome
    }

    /// process 結束：先 deregister 一次，再停掉 health endpoint 與 alive signal
    pub async fn shutdown(self) {
        if let Some(reconciler) = self.reconciler {
            reconciler.shutdown().await;
        }

        let _ = self.shutdown.send(true);

        match self.health.await {
            Ok(Err(e)) => tracing::error!("❌ Health endpoint failed: {}", e),
            Err(e) => tracing::error!("❌ Health endpoint task terminated abnormally: {}", e),
            Ok(Ok(())) => {}
        }
        if let Some(alive) = self.alive {
            let _ = alive.await;
        }

        if self.registration.is_some() {
            self.stats.log_final_stats();
        }
    }
}

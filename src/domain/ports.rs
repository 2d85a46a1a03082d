use crate::domain::model::Registration;
use async_trait::async_trait;
use std::time::Duration;

/// Registry 的三個操作。失敗一律回傳 false，不往外丟錯誤；重試由 reconciler 負責。
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn register(&self, registration: &Registration) -> bool;
    async fn deregister(&self, id: &str) -> bool;
    async fn is_registered(&self, id: &str) -> bool;
}

/// Reconciler 與 alive signal 寫入的觀測值
pub trait StatsRecorder: Send + Sync {
    fn record_registration(&self, success: bool);
    fn record_deregistered(&self);
    fn record_check(&self, duration: Duration);
    fn record_alive(&self, unix_seconds: i64);
}

//! 写操作的在途控制
//!
//! 同一实体同一时间最多只有一个在途写操作，重复提交直接返回 `OperationPending`。
//! 每个写操作先经过可配置的模拟延迟，延迟期间可被取消；取消或请求被丢弃时不会写入任何数据。

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use super::cancel::CancellationToken;
use crate::config::AppConfig;
use crate::errors::{LabDeskError, Result};

/// 实体键，例如 `submission:5`
pub fn entity_key(kind: &str, id: impl Display) -> String {
    format!("{kind}:{id}")
}

#[derive(Clone)]
pub struct PendingOperations {
    in_flight: Arc<DashMap<String, ()>>,
    latency: Duration,
    root: CancellationToken,
}

/// 在途槽位，释放时移除键
struct SlotGuard {
    in_flight: Arc<DashMap<String, ()>>,
    key: String,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
        debug!("Released in-flight slot {}", self.key);
    }
}

impl PendingOperations {
    pub fn new(latency: Duration, root: CancellationToken) -> Self {
        Self {
            in_flight: Arc::new(DashMap::new()),
            latency,
            root,
        }
    }

    /// 按 `mock.latency_ms` 创建
    pub fn from_config(root: CancellationToken) -> Self {
        Self::new(AppConfig::get().mock_latency(), root)
    }

    /// 根令牌，停机时取消
    pub fn root_token(&self) -> &CancellationToken {
        &self.root
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }

    fn acquire(&self, key: String) -> Result<SlotGuard> {
        match self.in_flight.entry(key) {
            Entry::Occupied(entry) => {
                info!("Rejected concurrent mutation of {}", entry.key());
                Err(LabDeskError::operation_pending(format!(
                    "Another operation on {} is still pending",
                    entry.key()
                )))
            }
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                entry.insert(());
                Ok(SlotGuard {
                    in_flight: self.in_flight.clone(),
                    key,
                })
            }
        }
    }

    /// 以根令牌的子令牌运行写操作
    pub async fn run<T, F>(&self, key: impl Into<String>, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let token = self.root.child_token();
        self.run_with_token(key, &token, operation).await
    }

    /// 运行写操作
    ///
    /// `operation` 只在延迟结束且未被取消时才会被轮询。
    pub async fn run_with_token<T, F>(
        &self,
        key: impl Into<String>,
        token: &CancellationToken,
        operation: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _slot = self.acquire(key.into())?;

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Err(LabDeskError::operation_cancelled("Operation was cancelled before it was applied"));
            }
            _ = tokio::time::sleep(self.latency) => {}
        }

        operation.await
    }
}

use tokio::signal;
use tracing::{error, warn};

use crate::runtime::cancel::CancellationToken;

/// 等待 Ctrl+C，随后取消所有在途写操作
pub async fn listen_for_shutdown(root: CancellationToken) {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // 无法监听信号时交由服务器自行结束
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
    cancel_pending(&root);
}

pub fn cancel_pending(root: &CancellationToken) {
    root.cancel();
    warn!("Pending operations cancelled");
}

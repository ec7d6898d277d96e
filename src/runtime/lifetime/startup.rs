use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{LabDeskError, Result};
use crate::runtime::cancel::CancellationToken;
use crate::runtime::pending::PendingOperations;
use crate::session::SessionService;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub session: Arc<SessionService>,
    pub pending: PendingOperations,
}

async fn build_backend(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} session store", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} session store: {}", name, e);
            None
        }
    }
}

/// 创建会话存储，配置的后端不可用时回退到 moka
async fn create_session_store() -> Result<Arc<dyn ObjectCache>> {
    let config = AppConfig::get();
    let store_type = config.session.store.as_str();

    warn!("Attempting to create {} session store", store_type);

    if get_object_cache_plugin(store_type).is_none() {
        warn!("Session store '{}' not found in registry", store_type);
    } else if let Some(store) = build_backend(store_type).await {
        return Ok(store);
    }

    if store_type != "moka" {
        warn!("Falling back to in-memory session store");
        if let Some(store) = build_backend("moka").await {
            return Ok(store);
        }
    }

    Err(LabDeskError::cache_plugin_not_found(format!(
        "No session store available (tried: {store_type})"
    )))
}

/// 准备服务器启动的上下文
/// 包括存储、会话存储、会话服务和在途写操作控制
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider was already installed");
    }

    crate::cache::register::register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Session store registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Memory storage initialized");

    let cache = create_session_store().await?;
    warn!("Session store initialized");

    let config = AppConfig::get();
    let session = Arc::new(SessionService::new(
        cache.clone(),
        storage.clone(),
        &config.auth.demo_password,
        config.session.ttl,
    )?);
    warn!("Session service initialized (demo credential, not a security boundary)");

    let pending = PendingOperations::from_config(CancellationToken::new());
    debug!(
        "Mutations use {} ms simulated latency",
        config.mock.latency_ms
    );

    Ok(StartupContext {
        storage,
        cache,
        session,
        pending,
    })
}

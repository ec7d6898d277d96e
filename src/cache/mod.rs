//! 会话键值存储层
//!
//! 会话服务只依赖一个按键读写的边界：`get / insert / remove`。
//! 具体后端（Moka 进程内缓存、Redis）以插件形式注册，启动时按配置选择。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 键可能存在但后端暂时无法读取（如连接失败）
    ExistsButNoValue,
}

impl<T> CacheResult<T> {
    pub fn found(self) -> Option<T> {
        match self {
            CacheResult::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// 读取原始字符串值
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// 写入原始字符串值，ttl 为 0 时使用后端默认策略
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    /// 删除键
    async fn remove(&self, key: &str);
    /// 清空全部键
    async fn invalidate_all(&self);
}

//! LabDesk - 实验课管理后端服务
//!
//! 基于 Actix Web 构建，管理学生、分组、作业、提交与评分。
//!
//! # 架构
//! - `cache`: 会话存储后端（Moka/Redis）
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `i18n`: 响应文案本地化
//! - `metrics`: 成绩与进度统计（纯函数）
//! - `middlewares`: 认证授权与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期与在途写操作
//! - `services`: 业务逻辑层
//! - `session`: 登录会话
//! - `storage`: 数据存储层（内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;

use std::sync::OnceLock;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::actors::entities::Role;

static JWT_SECRET: OnceLock<String> = OnceLock::new();

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (actor ID)
    pub sid: String,  // 会话ID，对应会话存储中的键
    pub role: String, // 用户角色
    pub exp: usize,   // Expiration time (时间戳)
    pub iat: usize,   // Issued at (签发时间)
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥，未配置时生成进程内随机密钥
    fn get_secret() -> &'static str {
        JWT_SECRET.get_or_init(|| {
            let configured = AppConfig::get().jwt.secret.clone();
            if configured.is_empty() {
                warn!("jwt.secret is empty, generated a random secret; tokens will not survive restarts");
                rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect()
            } else {
                configured
            }
        })
    }

    // 生成 Access Token
    pub fn generate_access_token(
        actor_id: i64,
        role: Role,
        session_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            actor_id,
            role,
            session_id,
            chrono::Duration::minutes(config.jwt.access_token_expiry),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        actor_id: i64,
        role: Role,
        session_id: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: actor_id.to_string(),
            sid: session_id.to_string(),
            role: role.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(Self::get_secret().as_bytes());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(Self::get_secret().as_bytes());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }
}

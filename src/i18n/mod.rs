//! 本地化字符串表
//!
//! 所有语言共用一套逻辑，文案放在 `assets/locales/<code>.json` 中，启动后首次访问时解析。
//! 查找顺序：请求语言 -> 英文 -> key 本身。

use std::collections::HashMap;

use actix_web::HttpRequest;
use actix_web::http::header::ACCEPT_LANGUAGE;
use once_cell::sync::Lazy;
use tracing::error;

use crate::config::AppConfig;
use crate::utils::assets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// 解析语言标签，只看主语言部分（`ru-RU` -> Ru）
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == primary)
    }

    /// 配置中的默认语言，无法识别时使用英文
    pub fn default_locale() -> Self {
        Self::from_tag(&AppConfig::get().app.default_locale).unwrap_or(Locale::En)
    }

    /// 取 Accept-Language 的第一个标签
    pub fn from_request(req: &HttpRequest) -> Self {
        req.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.split(';').next())
            .and_then(Self::from_tag)
            .unwrap_or_else(Self::default_locale)
    }
}

type Table = HashMap<String, String>;

static TABLES: Lazy<HashMap<Locale, Table>> = Lazy::new(|| {
    Locale::ALL
        .into_iter()
        .map(|locale| (locale, load_table(locale)))
        .collect()
});

fn load_table(locale: Locale) -> Table {
    let path = format!("locales/{}.json", locale.code());
    let parsed = assets::load_text(&path)
        .and_then(|raw| serde_json::from_str::<Table>(&raw).map_err(Into::into));
    match parsed {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to load string table {}: {}", path, e);
            Table::new()
        }
    }
}

/// 查找文案
pub fn t(locale: Locale, key: &str) -> String {
    TABLES
        .get(&locale)
        .and_then(|table| table.get(key))
        .or_else(|| TABLES.get(&Locale::En).and_then(|table| table.get(key)))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// 查找文案并替换 `{name}` 占位符
pub fn t_with(locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(locale, key), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

//! 嵌入的静态资源（本地化字符串表、演示数据）
//!
//! 编译时从 assets/ 目录读取文件。

use rust_embed::Embed;

use crate::errors::{LabDeskError, Result};

#[derive(Embed)]
#[folder = "assets/"]
struct EmbeddedAssets;

/// 读取嵌入资源的文本内容
pub fn load_text(path: &str) -> Result<String> {
    let file = EmbeddedAssets::get(path)
        .ok_or_else(|| LabDeskError::file_operation(format!("Embedded asset not found: {path}")))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| LabDeskError::file_operation(format!("Embedded asset {path} is not UTF-8: {e}")))
}

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{LabDeskError, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 必填文本字段：去掉首尾空白后不能为空
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LabDeskError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// 满分必须为正整数
pub fn validate_max_grade(max_grade: i64) -> Result<u32> {
    if max_grade <= 0 || max_grade > i64::from(u32::MAX) {
        return Err(LabDeskError::validation(format!(
            "max_grade must be a positive integer, got {max_grade}"
        )));
    }
    Ok(max_grade as u32)
}

/// 成绩范围校验：0 <= grade <= max_grade
///
/// 这是成绩进入系统的唯一入口，越界直接拒绝，不做截断。
pub fn validate_grade(grade: i64, max_grade: u32) -> Result<u32> {
    if grade < 0 || grade > i64::from(max_grade) {
        return Err(LabDeskError::invalid_grade(format!(
            "grade {grade} is outside [0, {max_grade}]"
        )));
    }
    Ok(grade as u32)
}

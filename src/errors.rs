//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_labdesk_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum LabDeskError {
            $($variant(String),)*
        }

        impl LabDeskError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(LabDeskError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(LabDeskError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(LabDeskError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl LabDeskError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        LabDeskError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_labdesk_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    Configuration("E003", "Configuration Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Conflict("E006", "Resource Conflict"),
    Serialization("E007", "Serialization Error"),
    FileOperation("E008", "File Operation Error"),
    Authentication("E009", "Authentication Error"),
    InvalidCredentials("E010", "Invalid Credentials"),
    Unauthorized("E011", "Unauthorized"),
    InvalidGrade("E012", "Invalid Grade"),
    DivisionUndefined("E013", "Division Undefined"),
    DeadlinePassed("E014", "Deadline Passed"),
    OperationPending("E015", "Operation Pending"),
    OperationCancelled("E016", "Operation Cancelled"),
}

impl LabDeskError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LabDeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LabDeskError {}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for LabDeskError {
    fn from(err: std::io::Error) -> Self {
        LabDeskError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LabDeskError {
    fn from(err: serde_json::Error) -> Self {
        LabDeskError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for LabDeskError {
    fn from(err: config::ConfigError) -> Self {
        LabDeskError::Configuration(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for LabDeskError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        LabDeskError::Authentication(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LabDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LabDeskError::cache_connection("test").code(), "E001");
        assert_eq!(LabDeskError::validation("test").code(), "E004");
        assert_eq!(LabDeskError::invalid_credentials("test").code(), "E010");
        assert_eq!(LabDeskError::invalid_grade("test").code(), "E012");
        assert_eq!(LabDeskError::operation_pending("test").code(), "E015");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            LabDeskError::division_undefined("test").error_type(),
            "Division Undefined"
        );
        assert_eq!(
            LabDeskError::unauthorized("test").error_type(),
            "Unauthorized"
        );
    }

    #[test]
    fn test_error_message() {
        let err = LabDeskError::deadline_passed("assignment 3");
        assert_eq!(err.message(), "assignment 3");
    }

    #[test]
    fn test_format_simple() {
        let err = LabDeskError::invalid_grade("grade 120 exceeds 100");
        let formatted = err.format_simple();
        assert!(formatted.contains("Invalid Grade"));
        assert!(formatted.contains("grade 120 exceeds 100"));
    }

    #[test]
    fn test_serde_error_converts() {
        let err: LabDeskError = serde_json::from_str::<i64>("nope").unwrap_err().into();
        assert_eq!(err.code(), "E007");
    }
}

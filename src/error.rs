//! 统一错误处理模块
//!
//! 提供translate-md项目的统一错误类型定义和处理机制

// 标准库导入
use std::fmt;

/// translate-md 统一错误类型
///
/// 覆盖配置、模板、远程翻译服务和文件操作四类失败点，
/// 每个变体都携带足够的上下文用于生成可操作的日志。
#[derive(Debug)]
pub enum TranslateMdError {
    /// 配置相关错误（配置文件、语言表、CLI参数）
    Configuration {
        /// 配置项名称
        field: String,
        /// 错误原因
        reason: String,
    },

    /// 模板文件校验错误
    Template {
        /// 模板路径
        path: String,
        /// 校验失败原因
        reason: String,
    },

    /// 源语言检测失败
    Detection {
        /// 错误消息
        message: String,
    },

    /// 翻译API相关错误
    TranslationApi {
        /// API响应状态码
        status_code: u16,
        /// 错误消息
        message: String,
        /// API地址
        api_url: String,
    },

    /// 网络请求相关错误
    Network {
        /// 错误消息
        message: String,
        /// HTTP状态码（如果适用）
        status_code: Option<u16>,
    },

    /// 文件操作相关错误
    FileOperation {
        /// 文件路径
        path: String,
        /// 操作类型（读取、写入、创建等）
        operation: String,
        /// 底层错误信息
        source: String,
    },
}

impl fmt::Display for TranslateMdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateMdError::Configuration { field, reason } => {
                write!(f, "配置错误 [{}]: {}", field, reason)
            }
            TranslateMdError::Template { path, reason } => {
                write!(f, "模板文件错误 [{}]: {}", path, reason)
            }
            TranslateMdError::Detection { message } => {
                write!(f, "源语言检测失败: {}", message)
            }
            TranslateMdError::TranslationApi {
                status_code,
                message,
                api_url,
            } => {
                write!(f, "翻译API错误 [{}] {}: {}", status_code, api_url, message)
            }
            TranslateMdError::Network {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "网络请求失败 [{}]: {}", code, message)
                } else {
                    write!(f, "网络请求失败: {}", message)
                }
            }
            TranslateMdError::FileOperation {
                path,
                operation,
                source,
            } => {
                write!(f, "文件{}操作失败 [{}]: {}", operation, path, source)
            }
        }
    }
}

impl std::error::Error for TranslateMdError {}

/// translate-md 结果类型别名
pub type Result<T> = std::result::Result<T, TranslateMdError>;

/// 便捷的错误创建宏
#[macro_export]
macro_rules! translate_error {
    (config, $field:expr, $reason:expr) => {
        $crate::error::TranslateMdError::Configuration {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    (template, $path:expr, $reason:expr) => {
        $crate::error::TranslateMdError::Template {
            path: $path.to_string(),
            reason: $reason.to_string(),
        }
    };
    (detection, $msg:expr) => {
        $crate::error::TranslateMdError::Detection {
            message: $msg.to_string(),
        }
    };
    (translation_api, $code:expr, $msg:expr, $url:expr) => {
        $crate::error::TranslateMdError::TranslationApi {
            status_code: $code,
            message: $msg.to_string(),
            api_url: $url.to_string(),
        }
    };
    (network, $msg:expr) => {
        $crate::error::TranslateMdError::Network {
            message: $msg.to_string(),
            status_code: None,
        }
    };
    (file_op, $path:expr, $op:expr, $source:expr) => {
        $crate::error::TranslateMdError::FileOperation {
            path: $path.to_string(),
            operation: $op.to_string(),
            source: $source.to_string(),
        }
    };
}

/// 从reqwest::Error转换为TranslateMdError
impl From<reqwest::Error> for TranslateMdError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        TranslateMdError::Network {
            message: error.to_string(),
            status_code,
        }
    }
}

/// 从std::io::Error转换为TranslateMdError
impl From<std::io::Error> for TranslateMdError {
    fn from(error: std::io::Error) -> Self {
        TranslateMdError::FileOperation {
            path: "unknown".to_string(),
            operation: "io".to_string(),
            source: error.to_string(),
        }
    }
}

/// 从serde_json::Error转换为TranslateMdError
impl From<serde_json::Error> for TranslateMdError {
    fn from(error: serde_json::Error) -> Self {
        TranslateMdError::Configuration {
            field: "json".to_string(),
            reason: error.to_string(),
        }
    }
}

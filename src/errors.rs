use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ScanlinkerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
}

impl ScanlinkerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ScanlinkerError::DatabaseConfig(_) => "E001",
            ScanlinkerError::DatabaseConnection(_) => "E002",
            ScanlinkerError::DatabaseOperation(_) => "E003",
            ScanlinkerError::FileOperation(_) => "E004",
            ScanlinkerError::Validation(_) => "E005",
            ScanlinkerError::NotFound(_) => "E006",
            ScanlinkerError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ScanlinkerError::DatabaseConfig(_) => "Database Configuration Error",
            ScanlinkerError::DatabaseConnection(_) => "Database Connection Error",
            ScanlinkerError::DatabaseOperation(_) => "Database Operation Error",
            ScanlinkerError::FileOperation(_) => "File Operation Error",
            ScanlinkerError::Validation(_) => "Validation Error",
            ScanlinkerError::NotFound(_) => "Resource Not Found",
            ScanlinkerError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ScanlinkerError::DatabaseConfig(msg)
            | ScanlinkerError::DatabaseConnection(msg)
            | ScanlinkerError::DatabaseOperation(msg)
            | ScanlinkerError::FileOperation(msg)
            | ScanlinkerError::Validation(msg)
            | ScanlinkerError::NotFound(msg)
            | ScanlinkerError::Serialization(msg) => msg,
        }
    }

    /// Store-side failures: logged server-side, never shown verbatim to callers
    pub fn is_internal(&self) -> bool {
        !matches!(
            self,
            ScanlinkerError::Validation(_) | ScanlinkerError::NotFound(_)
        )
    }

    /// HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            ScanlinkerError::Validation(_) => StatusCode::BAD_REQUEST,
            ScanlinkerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ScanlinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ScanlinkerError {}

// 便捷的构造函数
impl ScanlinkerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ScanlinkerError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for ScanlinkerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ScanlinkerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ScanlinkerError {
    fn from(err: std::io::Error) -> Self {
        ScanlinkerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ScanlinkerError {
    fn from(err: serde_json::Error) -> Self {
        ScanlinkerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanlinkerError>;

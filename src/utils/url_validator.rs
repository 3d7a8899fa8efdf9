//! URL 验证模块
//!
//! 只接受 http/https 目标地址，阻止危险协议

use url::Url;

use crate::errors::ScanlinkerError;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    Missing,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "URL is required"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for ScanlinkerError {
    fn from(err: UrlValidationError) -> Self {
        ScanlinkerError::validation(err.to_string())
    }
}

const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 校验并规范化目标 URL，返回去掉首尾空白后的原文
///
/// 存储的是用户提交的原文（仅 trim），不是 `Url` 解析后的序列化结果，
/// 因此同一 URL 的去重按原文比较。
pub fn normalize_url(raw: &str) -> Result<String, UrlValidationError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(UrlValidationError::Missing);
    }

    // Url::parse 会静默删除换行/制表符，原文存储后无法写入 Location 头
    if url.chars().any(char::is_control) {
        return Err(UrlValidationError::InvalidFormat(
            "control characters are not allowed".to_string(),
        ));
    }

    let lower = url.to_ascii_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(**p)) {
        return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| {
        if lower.starts_with("http://") || lower.starts_with("https://") {
            UrlValidationError::InvalidFormat(e.to_string())
        } else {
            UrlValidationError::InvalidProtocol(
                lower.split(':').next().unwrap_or_default().to_string(),
            )
        }
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(url.to_string())
}

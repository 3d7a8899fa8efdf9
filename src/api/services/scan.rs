use std::sync::Arc;

use actix_web::http::header::{CACHE_CONTROL, HeaderValue, LOCATION, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use crate::errors::ScanlinkerError;
use crate::services::{ScanService, classify};
use crate::utils::client_signature;

pub struct ScanRedirectService;

impl ScanRedirectService {
    /// GET /scan/{codeId}: count the scan, then send the caller on
    pub async fn handle_scan(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<Arc<ScanService>>,
    ) -> Result<HttpResponse, ScanlinkerError> {
        let code_id = path.into_inner();

        // 非 ASCII 的 User-Agent 视为缺失
        let user_agent = req.headers().get(USER_AGENT).and_then(|v| v.to_str().ok());
        let device = classify(user_agent);
        let signature = client_signature(&req);

        let receipt = service.register_scan(&code_id, &signature, device).await?;
        debug!(
            "Scan {} from {} ({}) -> total {}",
            code_id, signature, device, receipt.total
        );

        Ok(HttpResponse::Found()
            .insert_header((LOCATION, location_header(receipt.target_url)))
            .insert_header((CACHE_CONTROL, "no-store"))
            .finish())
    }
}

/// 不能直接作为头部值的目标地址转为 punycode / 百分号编码形式
fn location_header(target: String) -> String {
    if HeaderValue::from_str(&target).is_ok_and(|v| v.to_str().is_ok()) {
        return target;
    }
    url::Url::parse(&target).map(String::from).unwrap_or(target)
}

//! Code registration and statistics endpoints

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::trace;
use ts_rs::TS;

use crate::api::response::json_response;
use crate::errors::ScanlinkerError;
use crate::services::ScanService;
use crate::storage::models::TS_EXPORT_PATH;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateCodeRequest {
    #[serde(default)]
    #[ts(optional)]
    pub url: Option<String>,
}

/// `scanCount` is only present when an existing code was reused
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeResponse {
    pub code_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub scan_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    #[ts(type = "number")]
    pub scan_count: u64,
}

pub struct CodeService;

impl CodeService {
    /// POST /create
    pub async fn create(
        service: web::Data<Arc<ScanService>>,
        body: web::Json<CreateCodeRequest>,
    ) -> Result<HttpResponse, ScanlinkerError> {
        let url = body.into_inner().url.unwrap_or_default();
        let registration = service.register_url(&url).await?;

        let (status, scan_count) = if registration.created {
            (StatusCode::CREATED, None)
        } else {
            (StatusCode::OK, Some(registration.total))
        };

        Ok(json_response(
            status,
            &CreateCodeResponse {
                code_id: registration.code_id,
                scan_count,
            },
        ))
    }

    /// GET /count/{codeId}
    pub async fn count(
        service: web::Data<Arc<ScanService>>,
        path: web::Path<String>,
    ) -> Result<HttpResponse, ScanlinkerError> {
        let code_id = path.into_inner();
        let scan_count = service.get_total(&code_id).await?;
        trace!("Count for {}: {}", code_id, scan_count);

        Ok(json_response(StatusCode::OK, &CountResponse { scan_count }))
    }

    /// GET /all-counts
    pub async fn all_counts(
        service: web::Data<Arc<ScanService>>,
    ) -> Result<HttpResponse, ScanlinkerError> {
        let summaries = service.list_all().await?;
        Ok(json_response(StatusCode::OK, &summaries))
    }

    /// GET /users/{codeId}
    pub async fn users(
        service: web::Data<Arc<ScanService>>,
        path: web::Path<String>,
    ) -> Result<HttpResponse, ScanlinkerError> {
        let visitors = service.get_visitors(&path.into_inner()).await?;
        Ok(json_response(StatusCode::OK, &visitors))
    }
}

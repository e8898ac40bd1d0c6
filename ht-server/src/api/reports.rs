use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{api::ApiError, storage::ReportStore};

/// Name of the multipart field carrying the report file.
pub const REPORT_FIELD: &str = "report";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveReportResponse {
    pub status: String,
    pub file: String,
}

/// Handler for `POST /save-report`
pub async fn save_report(
    Extension(store): Extension<ReportStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SaveReportResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidMultipart(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidMultipart(e.to_string()))?
    {
        if field.name() != Some(REPORT_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or(ApiError::MissingFilename)?;
        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidMultipart(e.to_string()))?;

        let path = store.save(&filename, &contents).await?;

        return Ok(Json(SaveReportResponse {
            status: "success".to_string(),
            file: path.to_string(),
        }));
    }

    Err(ApiError::MissingReport)
}

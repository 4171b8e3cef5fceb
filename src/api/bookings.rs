//! Booking Handlers
//!
//! Consultation routes. Form parsing lives here; validation, storage and
//! notification are the booking desk's job.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::AppState;
use crate::booking::{BookingSubmission, Upload};
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, ListBookingsQuery, StatusUpdateRequest};

/// Multipart field carrying the optional document.
const DOCUMENT_FIELD: &str = "document";

fn malformed(err: MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed form data: {}", err.body_text()))
}

/// Reads the booking form: text fields into a submission, the document
/// field (if non-empty) into an upload. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<(BookingSubmission, Option<Upload>)> {
    let mut submission = BookingSubmission::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == DOCUMENT_FIELD {
            let file_name = field.file_name().unwrap_or("document").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(malformed)?;
            if !bytes.is_empty() {
                upload = Some(Upload {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field.text().await.map_err(malformed)?;
        let slot = match name.as_str() {
            "name" => &mut submission.name,
            "email" => &mut submission.email,
            "phone" => &mut submission.phone,
            "service" => &mut submission.service,
            "preferredDate" => &mut submission.preferred_date,
            "message" => &mut submission.message,
            _ => continue,
        };
        *slot = Some(text);
    }

    Ok((submission, upload))
}

/// Handler for POST /consultations
pub async fn create_booking_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse>)> {
    let (submission, upload) = read_form(multipart).await?;
    let record = state.bookings.submit(submission, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(Value::Object(record))
                .with_message("Consultation request received. We will contact you shortly."),
        ),
    ))
}

/// Handler for GET /consultations
pub async fn list_bookings_handler(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse>> {
    let status = query.status().map_err(ApiError::Validation)?;
    let records = state.bookings.list(status).await?;

    let data = Value::Array(records.into_iter().map(Value::Object).collect());
    Ok(Json(ApiResponse::ok(data)))
}

/// Handler for PATCH /consultations/:id
pub async fn update_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse>> {
    let status = req.status().map_err(ApiError::Validation)?;
    let record = state.bookings.update_status(&id, status).await?;

    Ok(Json(
        ApiResponse::ok(Value::Object(record))
            .with_message(format!("Booking status updated to {}", status.as_str())),
    ))
}

/// Handler for DELETE /consultations/:id
pub async fn delete_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>> {
    state.bookings.delete(&id).await?;
    Ok(Json(ApiResponse::message(format!("Booking '{}' deleted", id))))
}

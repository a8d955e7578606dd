// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the Herald REST API.
//!
//! Field validation happens at this boundary; everything past it deals in
//! already-validated values. Handlers convert pipeline errors into the
//! `{"error": {"code", "message"}}` envelope.

use std::sync::LazyLock;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use herald_core::{DeliveryRecord, HeraldError, Page, PageRequest, RequestId, SmsRequest};
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::error;

use crate::server::GatewayState;

/// Indian mobile numbers only: +91 followed by a 10-digit number
/// starting 6-9.
static PHONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+91[6-9][0-9]{9}$").expect("phone number regex is valid"));

const PHONE_NUMBER_MESSAGE: &str = "Phone number must start with +91 and must be of 10 digits";
const EMPTY_MESSAGE: &str = "Message content cannot be empty.";

// ---- Envelopes ----

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Paginated success envelope: `{"data": [...], "pagination": {...}}`.
#[derive(Debug, Serialize)]
pub struct PagedEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> PagedEnvelope<T> {
    fn from_page(page: Page<T>) -> Self {
        Self {
            pagination: PaginationMeta {
                current_page: page.page,
                page_size: page.size,
                total_pages: page.total_pages,
                total_items: page.total_items,
            },
            data: page.items,
        }
    }
}

/// Error envelope: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// An API failure ready to render as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "RESOURCE_NOT_FOUND",
            message: message.into(),
        }
    }

    fn internal(operation: &str, e: &HeraldError) -> Self {
        error!(error = %e, operation, "request handling failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_SERVER_ERROR",
            message: format!("Failed to {operation}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    code: self.code,
                    message: self.message,
                },
            }),
        )
            .into_response()
    }
}

// ---- Extractors ----

/// Query-string extractor whose rejection renders as an error envelope.
///
/// Axum's built-in `Query` rejection is plain text; every response from
/// this API must be a JSON envelope, missing or malformed parameters
/// included.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// JSON body extractor whose rejection renders as an error envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

// ---- DTOs ----

/// Request body for POST /v1/sms/send.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    pub phone_number: String,
    pub message: String,
}

/// Response body for POST /v1/sms/send.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsResponse {
    pub request_id: String,
    pub comments: String,
}

/// Request record as exposed by GET /v1/sms/{requestId}.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequestView {
    pub request_id: String,
    pub phone_number: String,
    pub message: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_comments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SmsRequest> for SmsRequestView {
    fn from(request: SmsRequest) -> Self {
        Self {
            request_id: request.id.to_string(),
            phone_number: request.recipient,
            message: request.body,
            status: request.state.to_string(),
            failure_code: request.failure_code.map(|c| c.to_string()),
            failure_comments: request.failure_detail,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Request body for POST and DELETE /v1/blacklist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistRequest {
    pub phone_numbers: Vec<String>,
}

/// Delivery log entry as exposed by the log query endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecordView {
    pub request_id: String,
    pub phone_number: String,
    pub message: String,
    pub sent_at: String,
}

impl From<DeliveryRecord> for DeliveryRecordView {
    fn from(record: DeliveryRecord) -> Self {
        Self {
            request_id: record.request_id.to_string(),
            phone_number: record.recipient,
            message: record.body,
            sent_at: record.sent_at,
        }
    }
}

/// Query parameters for GET /v1/sms-logs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub phone_number: String,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

/// Query parameters for GET /v1/sms-logs/search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_start_time() -> String {
    "0000-01-01T00:00:00.000Z".to_string()
}

fn default_end_time() -> String {
    "9999-12-31T23:59:59.999Z".to_string()
}

fn default_page_size() -> u32 {
    10
}

/// Largest page size the log endpoints will serve.
const MAX_PAGE_SIZE: u32 = 100;

fn page_request(page: u32, size: u32) -> Result<PageRequest, ApiError> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ApiError::bad_request(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(PageRequest { page, size })
}

// ---- Handlers ----

/// POST /v1/sms/send
///
/// Validates the phone number and message, then hands the request to
/// intake. The identifier is returned even when the request was failed at
/// intake time (enqueue failure); callers poll GET /v1/sms/{id} for the
/// outcome.
pub async fn post_sms_send(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<SendSmsRequest>,
) -> Result<Json<DataEnvelope<SendSmsResponse>>, ApiError> {
    if !PHONE_NUMBER.is_match(&body.phone_number) {
        return Err(ApiError::bad_request(PHONE_NUMBER_MESSAGE));
    }
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request(EMPTY_MESSAGE));
    }

    let id = state
        .intake
        .submit(body.phone_number, body.message)
        .await
        .map_err(|e| ApiError::internal("process sms request", &e))?;

    Ok(Json(DataEnvelope {
        data: SendSmsResponse {
            request_id: id.to_string(),
            comments: "Successfully processed request".to_string(),
        },
    }))
}

/// GET /v1/sms/{requestId}
pub async fn get_sms_request(
    State(state): State<GatewayState>,
    Path(request_id): Path<String>,
) -> Result<Json<DataEnvelope<SmsRequestView>>, ApiError> {
    let id = RequestId(request_id.clone());
    let request = state
        .store
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::internal("fetch sms request", &e))?
        .ok_or_else(|| {
            ApiError::not_found(format!("Sms request with id {request_id} not found."))
        })?;

    Ok(Json(DataEnvelope {
        data: request.into(),
    }))
}

/// POST /v1/blacklist
pub async fn post_blacklist(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<BlacklistRequest>,
) -> Result<Json<DataEnvelope<String>>, ApiError> {
    let numbers = validated_numbers(body)?;
    state
        .blacklist
        .add(&numbers)
        .await
        .map_err(|e| ApiError::internal("blacklist numbers", &e))?;

    Ok(Json(DataEnvelope {
        data: "Successfully blacklisted".to_string(),
    }))
}

/// DELETE /v1/blacklist
pub async fn delete_blacklist(
    State(state): State<GatewayState>,
    ApiJson(body): ApiJson<BlacklistRequest>,
) -> Result<Json<DataEnvelope<String>>, ApiError> {
    let numbers = validated_numbers(body)?;
    state
        .blacklist
        .remove(&numbers)
        .await
        .map_err(|e| ApiError::internal("whitelist numbers", &e))?;

    Ok(Json(DataEnvelope {
        data: "Successfully whitelisted".to_string(),
    }))
}

/// GET /v1/blacklist
pub async fn get_blacklist(
    State(state): State<GatewayState>,
) -> Result<Json<DataEnvelope<Vec<String>>>, ApiError> {
    let numbers = state
        .blacklist
        .list()
        .await
        .map_err(|e| ApiError::internal("fetch blacklisted numbers", &e))?;

    Ok(Json(DataEnvelope { data: numbers }))
}

/// GET /v1/sms-logs
pub async fn get_sms_logs(
    State(state): State<GatewayState>,
    ApiQuery(query): ApiQuery<LogQuery>,
) -> Result<Json<PagedEnvelope<DeliveryRecordView>>, ApiError> {
    let page = page_request(query.page, query.size)?;
    let results = state
        .delivery_log
        .find_by_recipient(&query.phone_number, &query.start_time, &query.end_time, page)
        .await
        .map_err(|e| ApiError::internal("fetch sms logs", &e))?;

    Ok(Json(PagedEnvelope::from_page(
        results.map_items(DeliveryRecordView::from),
    )))
}

/// GET /v1/sms-logs/search
pub async fn get_sms_logs_search(
    State(state): State<GatewayState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<PagedEnvelope<DeliveryRecordView>>, ApiError> {
    let page = page_request(query.page, query.size)?;
    let results = state
        .delivery_log
        .search(&query.text, page)
        .await
        .map_err(|e| ApiError::internal("search sms logs", &e))?;

    Ok(Json(PagedEnvelope::from_page(
        results.map_items(DeliveryRecordView::from),
    )))
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
///
/// Liveness plus one storage round trip through the blacklist store.
pub async fn get_health(State(state): State<GatewayState>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .blacklist
        .list()
        .await
        .map_err(|e| ApiError::internal("reach storage", &e))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

fn validated_numbers(body: BlacklistRequest) -> Result<Vec<String>, ApiError> {
    if body.phone_numbers.is_empty() {
        return Err(ApiError::bad_request("phoneNumbers must not be empty"));
    }
    for number in &body.phone_numbers {
        if !PHONE_NUMBER.is_match(number) {
            return Err(ApiError::bad_request(PHONE_NUMBER_MESSAGE));
        }
    }
    Ok(body.phone_numbers)
}

//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies every failure a handler can produce and converts
//! into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Bodies
//! are always `{"error": <message>, "status": <code>}`.
//!
//! Server-side failures are logged by [`log_failures`], which sees the
//! request line; the response only carries the failure text along as an
//! [`ErrorDetail`] extension.

use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use voteapi_db::DbError;
use voteapi_types::ValidationError;

/// Realm announced in `WWW-Authenticate` on 401 responses.
pub const AUTH_REALM: &str = r#"Basic realm="voteapi""#;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request path, body, or a field in it was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A mutation arrived without valid admin credentials.
    #[error("admin credentials required")]
    Unauthorized,

    /// The data layer failed or rejected the operation.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status code and client-facing message.
    ///
    /// Infrastructure failures are reported generically; their detail only
    /// goes to the log.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Db(err) => match err {
                DbError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                DbError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DbError::InUse(_) => (StatusCode::CONFLICT, err.to_string()),
                DbError::Overloaded { .. } => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
                DbError::Postgres(_)
                | DbError::Config(_)
                | DbError::SchemaUnavailable
                | DbError::Shape { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal error"),
                ),
            },
        }
    }
}

/// Full text of a 5xx failure, attached to the response for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        let mut response = (status, axum::Json(body)).into_response();
        if matches!(self, Self::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_REALM),
            );
        }
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));
        }
        response
    }
}

/// Middleware: log every 5xx with the request that caused it.
pub async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    if let Some(ErrorDetail(error)) = response.extensions().get::<ErrorDetail>() {
        tracing::error!(
            %method,
            %path,
            status = response.status().as_u16(),
            %error,
            "Request failed"
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use voteapi_types::EntityKind;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn outcome_classes_map_to_status_codes() {
        assert_eq!(
            status_of(ValidationError::EmptyName.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DbError::Validation(ValidationError::MissingDistrict).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DbError::NotFound(EntityKind::Office).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DbError::InUse(EntityKind::State).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DbError::Overloaded { attempts: 3 }.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DbError::SchemaUnavailable.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        let (_, message) = ApiError::from(DbError::NotFound(EntityKind::District))
            .status_and_message();
        assert_eq!(message, "no such district");
    }

    #[test]
    fn infrastructure_detail_is_not_leaked() {
        let (_, message) =
            ApiError::from(DbError::Config(String::from("secret url"))).status_and_message();
        assert_eq!(message, "internal error");
    }

    #[test]
    fn server_errors_carry_detail_for_the_log() {
        let response =
            ApiError::from(DbError::Config(String::from("bad pool"))).into_response();
        assert_eq!(
            response.extensions().get::<ErrorDetail>(),
            Some(&ErrorDetail(String::from("Configuration error: bad pool")))
        );

        let response = ApiError::from(DbError::NotFound(EntityKind::State)).into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static(AUTH_REALM))
        );
    }
}

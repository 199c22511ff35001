//! ARES lookup route

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{AppError, ErrorCode};
use shared::models::AresSubject;

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::services::AresError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/ares/{ico}", get(lookup))
}

impl From<AresError> for AppError {
    fn from(e: AresError) -> Self {
        match e {
            AresError::InvalidIco(ico) => AppError::new(ErrorCode::InvalidIco).with_detail("ico", ico),
            AresError::NotFound(ico) => {
                AppError::new(ErrorCode::AresSubjectNotFound).with_detail("ico", ico)
            }
            AresError::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "ARES lookup failed");
                AppError::new(ErrorCode::AresUnavailable)
            }
        }
    }
}

/// Company details for an IČO
pub async fn lookup(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(ico): Path<String>,
) -> ApiResult<AresSubject> {
    let subject = state.ares.lookup(&ico).await.map_err(AppError::from)?;
    Ok(Json(subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_ares_errors_map_to_status() {
        let status = |e: AresError| AppError::from(e).http_status();
        assert_eq!(status(AresError::InvalidIco("1".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AresError::NotFound("27074358".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status(AresError::Unavailable("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

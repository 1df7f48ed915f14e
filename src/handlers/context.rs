use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

pub const STAFF_ID_HEADER: &str = "X-Staff-Id";
pub const STAFF_ROLE_HEADER: &str = "X-Staff-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Staff,
    Admin,
}

/// Identity forwarded by the authentication layer in front of this service.
/// The headers are trusted as-is.
#[derive(Debug, Clone, Copy)]
pub struct StaffContext {
    pub staff_id: Uuid,
    pub role: StaffRole,
}

impl StaffContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let staff_id = headers
            .get(STAFF_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("{} header is required", STAFF_ID_HEADER)))?;
        let staff_id = Uuid::parse_str(staff_id.trim())
            .map_err(|_| AppError::Unauthorized(format!("{} must be a UUID", STAFF_ID_HEADER)))?;

        let role = match headers.get(STAFF_ROLE_HEADER).and_then(|v| v.to_str().ok()) {
            Some(r) if r.trim().eq_ignore_ascii_case("admin") => StaffRole::Admin,
            _ => StaffRole::Staff,
        };

        Ok(Self { staff_id, role })
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            StaffRole::Admin => Ok(()),
            StaffRole::Staff => Err(AppError::Forbidden(
                "this operation is restricted to administrators".to_string(),
            )),
        }
    }
}

impl FromRequest for StaffContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req.headers()))
    }
}

use actix_web::http::header::HeaderMap;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const IS_ADMIN_HEADER: &str = "x-is-admin";

/// Who is asking, as declared by the request headers.
///
/// Attached to every GraphQL request; resolvers read it through `auth::ContextExt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<i32>,
    pub is_admin: bool,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            is_admin: false,
        }
    }

    pub fn admin(user_id: Option<i32>) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Reads `x-user-id` and `x-is-admin`.
    ///
    /// A missing or empty `x-user-id` yields an anonymous context; a value that is not an
    /// integer is rejected. `x-is-admin` grants admin rights only when it equals `true`
    /// (any letter case).
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = match headers.get(USER_ID_HEADER) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    AppError::BadRequest(format!("{} header is not valid text", USER_ID_HEADER))
                })?;
                let raw = raw.trim();
                if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<i32>().map_err(|_| {
                        AppError::BadRequest(format!(
                            "{} header must be an integer, got {:?}",
                            USER_ID_HEADER, raw
                        ))
                    })?)
                }
            }
            None => None,
        };

        let is_admin = headers
            .get(IS_ADMIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self { user_id, is_admin })
    }

    /// Admins may touch anything; everybody else only what they own.
    pub fn can_access(&self, owner_id: i32) -> bool {
        self.is_admin || self.user_id == Some(owner_id)
    }
}

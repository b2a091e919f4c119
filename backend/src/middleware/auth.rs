//! Authentication middleware
//!
//! Verifies bearer tokens issued by the identity service and gates admin routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::CreatedBy;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Account role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Home estate, pre-selected on the report form
    #[serde(default)]
    pub kebun: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub kebun: Option<String>,
    pub avatar: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Author block stamped on new reports
    pub fn created_by(&self) -> CreatedBy {
        CreatedBy {
            name: self.name.clone().or_else(|| self.email.clone()),
            avatar: self.avatar.clone(),
            email: self.email.clone(),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            kebun: claims.kebun,
            avatar: claims.avatar,
        }
    }
}

/// Decode and verify an HS256 token
pub fn decode_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::MissingToken.into_response();
    };

    let claims = match decode_jwt(bearer.token(), &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthUser::from(claims));

    next.run(request).await
}

/// Rejects non-admin users; must run after [`auth_middleware`]
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => AppError::InsufficientPermissions.into_response(),
        None => AppError::MissingToken.into_response(),
    }
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(role: Role, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".into(),
            email: Some("mandor@example.com".into()),
            name: None,
            role,
            kebun: Some("1KSD".into()),
            avatar: None,
            exp: now + exp_offset,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let claims = decode_jwt(&token(Role::Admin, 3600), "test-secret").unwrap();
        let user = AuthUser::from(claims);
        assert!(user.is_admin());
        assert_eq!(user.kebun.as_deref(), Some("1KSD"));
        // Falls back to the email when the token has no name
        assert_eq!(user.created_by().name.as_deref(), Some("mandor@example.com"));
    }

    #[test]
    fn test_decode_rejects_wrong_secret_and_expiry() {
        assert!(matches!(
            decode_jwt(&token(Role::User, 3600), "other-secret"),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            decode_jwt(&token(Role::User, -3600), "test-secret"),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_role_defaults_to_user() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(Role::default(), Role::User);
    }
}

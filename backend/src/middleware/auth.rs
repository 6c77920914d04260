use crate::error::KrishiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub farmer_id: i32,
    pub phone: Option<String>,
    pub exp: usize,
}

const PUBLIC_ROUTES: &[&str] = &["/api/health"];
const PUBLIC_PREFIXES: &[&str] = &["/api/online/"];

fn is_public(path: &str) -> bool {
    !path.starts_with("/api/")
        || PUBLIC_ROUTES.contains(&path)
        || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, KrishiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| KrishiError::Auth(format!("Invalid token: {}", e)))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, KrishiError> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| KrishiError::Auth("No token, authorization denied".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| KrishiError::Auth("Malformed authorization header".to_string()))?;

    let claims = decode_claims(token, &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

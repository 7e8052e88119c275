use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use skybook_core::user::{LoginRequest, RegisterRequest, User, CUSTOMER_ROLE};
use tracing::info;
use uuid::Uuid;

use crate::middleware::CustomerClaims;
use crate::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

#[derive(Debug, Serialize)]
struct Registered {
    id: Uuid,
    message: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    token_type: &'static str,
    expires_in: u64,
    message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = CustomerClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.clone(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Registered>), AppError> {
    request.validate()?;

    if state.users.find_by_email(&request.email).await?.is_some() {
        return Err(AppError::ConflictError(format!(
            "User already exists with email {}",
            request.email
        )));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))?;

    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        password_hash,
        role: CUSTOMER_ROLE.to_string(),
        created_at: Utc::now(),
    };
    let user = state.users.create_user(&user).await?;
    info!("User registered: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(Registered {
            id: user.id,
            message: format!("user created with id: {}", user.id),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("User not found".to_string()))?;

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password check task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Stored password hash unusable: {}", e)))?;

    if !verified {
        return Err(AppError::AuthenticationError("Invalid password".to_string()));
    }

    let token = issue_token(&state.auth, &user)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.auth.expiration,
        message: "Login successful",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn test_token_round_trips_claims() {
        let auth = AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 600,
            enforce_on_bookings: true,
        };
        let user = User {
            id: Uuid::new_v4(),
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            password_hash: String::new(),
            role: CUSTOMER_ROLE.to_string(),
            created_at: Utc::now(),
        };

        let token = issue_token(&auth, &user).unwrap();
        let data = decode::<CustomerClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user.id.to_string());
        assert_eq!(data.claims.email, "ravi@example.com");
        assert_eq!(data.claims.role, CUSTOMER_ROLE);
    }
}

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};
use uuid::Uuid;

use numu_db::queries::NewUser;
use numu_remote::{Synced, USERS, rows::user_row};
use numu_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionResponse,
};
use numu_types::models::Role;

use crate::error::JsonBody;
use crate::state::{AppState, run_db};

const TOKEN_TTL_DAYS: i64 = 30;

/// Registration input rules; failures never reach the marketplace.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), &'static str> {
    let name_len = req.name.trim().chars().count();
    if !(3..=64).contains(&name_len) {
        return Err("name must be 3-64 characters");
    }
    if !req.email.contains('@') {
        return Err("email is invalid");
    }
    if req.password.len() < 8 {
        return Err("password must be at least 8 characters");
    }
    if req.role == Role::Admin {
        return Err("admin accounts cannot self-register");
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if let Err(reason) = validate_registration(&req) {
        warn!("Rejected registration for {}: {}", req.email, reason);
        return Err(StatusCode::BAD_REQUEST);
    }

    let email = req.email.trim().to_lowercase();
    let taken = {
        let email = email.clone();
        run_db(&state, move |db| db.email_exists(&email)).await?
    };
    if taken {
        return Err(StatusCode::CONFLICT);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    let name = req.name.trim().to_string();
    let phone = req.phone.clone().filter(|p| !p.trim().is_empty());
    {
        let (email, name, phone) = (email.clone(), name.clone(), phone.clone());
        let role = req.role;
        run_db(&state, move |db| {
            db.create_user(&NewUser {
                id: &user_id.to_string(),
                email: &email,
                name: &name,
                phone: phone.as_deref(),
                role: role.as_str(),
                password_hash: &password_hash,
            })
        })
        .await?;
    }
    info!("Registered {} as {} ({})", email, req.role, user_id);

    let mirrored = match state.remote.sign_up(&email, &req.password).await {
        Ok(_) => {
            state
                .remote
                .insert(USERS, user_row(user_id, &email, &name, req.role, phone.as_deref()))
                .await
        }
        Err(e) => Err(e),
    };
    let synced = Synced::from_remote(user_id, mirrored, "sign-up");

    let token = create_token(&state.jwt_secret, user_id, &name, req.role, None)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            sync: synced.status(),
            user_id: synced.into_value(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let email = req.email.trim().to_lowercase();
    let user = {
        let email = email.clone();
        run_db(&state, move |db| db.get_user_by_email(&email)).await?
    }
    .ok_or(StatusCode::UNAUTHORIZED)?;

    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: Uuid = user.id.parse().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let role: Role = user.role.parse().map_err(|e| {
        error!("Stored user {} has a bad role: {}", user.id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let remote = state.remote.sign_in_with_password(&email, &req.password).await;
    let remote_token = remote.as_ref().ok().map(|s| s.access_token.clone());
    let synced = Synced::from_remote((), remote, "sign-in");

    let token = create_token(&state.jwt_secret, user_id, &user.name, role, remote_token)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        user_id,
        name: user.name,
        role,
        token,
        sync: synced.status(),
    }))
}

/// Tokens are stateless; logging out only ends the remote session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let synced = match &claims.remote_token {
        Some(token) => Synced::from_remote((), state.remote.sign_out(token).await, "sign-out"),
        None => Synced::LocalOnly {
            value: (),
            reason: "no remote session".to_string(),
        },
    };
    Json(synced.into_response())
}

pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let remote_user_id = match &claims.remote_token {
        Some(token) => match state.remote.get_session(token).await {
            Ok(user) => Some(user.id),
            Err(e) => {
                warn!("Remote session lookup for {} failed: {}", claims.sub, e);
                None
            }
        },
        None => None,
    };

    Json(SessionResponse {
        user_id: claims.sub,
        name: claims.name,
        role: claims.role,
        remote_user_id,
    })
}

pub fn create_token(
    secret: &str,
    user_id: Uuid,
    name: &str,
    role: Role,
    remote_token: Option<String>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        role,
        remote_token,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

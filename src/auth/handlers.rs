use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie,
        dto::{present, AuthResponse, LoginRequest, LoginStatus, RegisterRequest},
        password::verify_password,
    },
    error::{AppError, AppResult, DUPLICATE_EMAIL},
    extract::JsonBody,
    state::AppState,
    users::{
        dto::MessageResponse,
        services::{create_user, NewUser},
        validation::MIN_PASSWORD_LEN,
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/loggedin", get(login_status))
        .route("/forgotpassword", post(forgot_password))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let (Some(name), Some(email), Some(password)) = (
        present(payload.name),
        present(payload.email),
        present(payload.password),
    ) else {
        return Err(AppError::validation(
            "All fields are required: name, email, and password.",
        ));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation(
            "Password must be at least 6 characters long.",
        ));
    }

    let email = email.trim().to_owned();
    if state.store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
    }

    // A concurrent registration can still win the race; the store's
    // uniqueness check turns that into the same conflict.
    let user = create_user(
        state.store.as_ref(),
        NewUser {
            name,
            email,
            password,
        },
    )
    .await?;

    let token = state.jwt.sign(user.id)?;
    let jar = cookie::attach(jar, &token, state.jwt.ttl());

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (Some(email), Some(password)) = (present(payload.email), present(payload.password))
    else {
        return Err(AppError::validation(
            "All fields are required: email and password.",
        ));
    };
    let email = email.trim();

    // Unknown email and wrong password get different messages.
    let Some(user) = state.store.find_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::not_found("User not found, please sign up."));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.sign(user.id)?;
    let jar = cookie::attach(jar, &token, state.jwt.ttl());

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Clears the cookie unconditionally. Tokens are stateless, so nothing on the
/// server changes.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        cookie::clear(jar),
        Json(MessageResponse::new("Successfully Logged Out")),
    )
}

/// Never fails: a missing, expired or forged token just reads as logged out.
#[instrument(skip(state, jar))]
pub async fn login_status(State(state): State<AppState>, jar: CookieJar) -> Json<LoginStatus> {
    let logged_in = cookie::read(&jar)
        .map(|token| state.jwt.verify(&token).is_ok())
        .unwrap_or(false);
    Json(LoginStatus { logged_in })
}

// TODO: implement reset once a mail delivery channel for reset links exists.
pub async fn forgot_password() -> AppResult<Json<MessageResponse>> {
    Err(AppError::Unimplemented(
        "Password reset is not available.".into(),
    ))
}

use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::present, extractors::CurrentUser},
    error::{AppError, AppResult},
    extract::{JsonBody, JsonOrEmpty},
    state::AppState,
    users::{
        dto::{ChangePasswordRequest, MessageResponse, PublicUser, UpdateUserRequest},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/getuser", get(get_user))
        .route("/updateuser", patch(update_user))
        .route("/changepassword", patch(change_password))
}

/// The extractor already loaded the record for this request.
#[instrument]
pub async fn get_user(CurrentUser(me): CurrentUser) -> Json<PublicUser> {
    Json(me)
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    JsonOrEmpty(payload): JsonOrEmpty<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = services::update_profile(state.store.as_ref(), me.id, payload.into()).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (Some(old_password), Some(password)) =
        (present(payload.old_password), present(payload.password))
    else {
        return Err(AppError::validation(
            "Please provide both old and new passwords.",
        ));
    };

    services::change_password(state.store.as_ref(), me.id, &old_password, password).await?;
    Ok(Json(MessageResponse::new("Password changed successfully.")))
}

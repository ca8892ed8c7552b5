//! Account endpoints: registration, email verification, login/logout, and
//! password recovery.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use serde::Deserialize;

use crate::api::types::FileUpload;
use crate::error::Error;
use crate::net::dispatcher::ApiClient;
use crate::session::types::{Session, User};

const REGISTER_PATH: &str = "/api/auth/register";
const VERIFY_EMAIL_PATH: &str = "/api/auth/verify-email";
const RESEND_CODE_PATH: &str = "/api/auth/resend-code";
const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
const PROFILE_PATH: &str = "/api/auth/profile";

fn reset_password_path(token: &str) -> String {
    format!("/api/auth/reset-password?token={token}")
}

/// New-account submission; the server answers with a verification handle.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<FileUpload>,
}

/// Handle returned by [`register`], needed to verify the email address.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
}

/// Fields of a profile update; `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub picture: Option<FileUpload>,
}

/// Submits a registration. The account stays inactive until
/// [`verify_email`] confirms the emailed code.
///
/// # Errors
///
/// Returns [`Error::Api`] when the server rejects the submission (taken
/// username, invalid email, ...).
pub async fn register(api: &ApiClient, request: &Registration) -> Result<RegisterResponse, Error> {
    api.post_multipart(REGISTER_PATH, || registration_form(request))
        .await
}

/// Confirms the verification code emailed during registration.
///
/// # Errors
///
/// Returns [`Error::Api`] when the code is wrong or expired.
pub async fn verify_email(api: &ApiClient, user_id: &str, code: &str) -> Result<(), Error> {
    api.post_unit(
        VERIFY_EMAIL_PATH,
        &serde_json::json!({ "userId": user_id, "code": code }),
    )
    .await
}

/// Requests a fresh verification code.
///
/// # Errors
///
/// Returns [`Error::Api`] on server rejection.
pub async fn resend_code(api: &ApiClient, email: &str) -> Result<(), Error> {
    api.post_unit(RESEND_CODE_PATH, &serde_json::json!({ "email": email }))
        .await
}

/// Authenticates with a username-or-email identifier and installs the
/// returned session into the auth state.
///
/// # Errors
///
/// Returns [`Error::Api`] on bad credentials and [`Error::Store`] when the
/// session cannot be persisted.
pub async fn login(api: &ApiClient, identifier: &str, password: &str) -> Result<Session, Error> {
    let session: Session = api
        .post_json(
            LOGIN_PATH,
            &serde_json::json!({ "identifier": identifier, "password": password }),
        )
        .await?;
    api.auth().login_success(session.clone())?;
    Ok(session)
}

/// Logs out: notifies the server best-effort, then clears the local session
/// unconditionally. Idempotent.
///
/// # Errors
///
/// Returns [`Error::Store`] when the persisted session cannot be removed.
pub async fn logout(api: &ApiClient) -> Result<(), Error> {
    if let Err(error) = api.post_unit(LOGOUT_PATH, &serde_json::json!({})).await {
        tracing::warn!(%error, "server logout failed; clearing local session anyway");
    }
    api.auth().clear()
}

/// Starts password recovery for the given email.
///
/// # Errors
///
/// Returns [`Error::Api`] on server rejection.
pub async fn forgot_password(api: &ApiClient, email: &str) -> Result<(), Error> {
    api.post_unit(FORGOT_PASSWORD_PATH, &serde_json::json!({ "email": email }))
        .await
}

/// Completes password recovery with the token from the reset email.
///
/// # Errors
///
/// Returns [`Error::Api`] when the token is invalid or expired.
pub async fn reset_password(api: &ApiClient, token: &str, password: &str) -> Result<(), Error> {
    api.post_unit(
        &reset_password_path(token),
        &serde_json::json!({ "password": password }),
    )
    .await
}

/// Updates the logged-in user's display name and/or profile picture,
/// returning the updated identity record.
///
/// # Errors
///
/// Returns [`Error::Api`] when not authenticated or on validation failure.
pub async fn update_profile(api: &ApiClient, update: &ProfileUpdate) -> Result<User, Error> {
    api.put_multipart(PROFILE_PATH, || profile_form(update)).await
}

fn registration_form(request: &Registration) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new()
        .text("name", request.name.clone())
        .text("username", request.username.clone())
        .text("email", request.email.clone())
        .text("password", request.password.clone());
    if let Some(picture) = &request.profile_picture {
        form = form.part("profilePicture", picture.part());
    }
    form
}

fn profile_form(update: &ProfileUpdate) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    if let Some(name) = &update.name {
        form = form.text("name", name.clone());
    }
    if let Some(picture) = &update.picture {
        form = form.part("profilePicture", picture.part());
    }
    form
}

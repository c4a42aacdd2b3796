//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::StaffRepository;
use crate::utils::AppError;

use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates staff credentials and returns a JWT token.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = StaffRepository::new(state.get_db());
    let staff = repo.find_by_username(&req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let staff = match staff {
        Some(s) => {
            if !s.is_active {
                return Err(AppError::forbidden("Account has been disabled"));
            }

            let password_valid = s
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            s
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt_service = state.get_jwt_service();
    let staff_id = staff.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

    let token = jwt_service
        .generate_token(&staff_id, &staff.username, &staff.display_name, staff.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        staff_id = %staff_id,
        username = %staff.username,
        role = %staff.role,
        "Staff logged in"
    );

    let response = LoginResponse {
        token,
        expires_in: jwt_service.config.expiration_minutes * 60,
        user: UserInfo {
            id: staff_id,
            username: staff.username,
            display_name: staff.display_name,
            email: staff.email,
            role: staff.role,
            permitted_actions: staff.role.permitted_actions(),
        },
    };

    Ok(Json(response))
}

/// Get current user info from the validated token.
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    // Fresh read so a deactivation takes effect before token expiry.
    let repo = StaffRepository::new(state.get_db());
    let staff = repo
        .find_by_username(&user.username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Staff '{}' not found", user.username)))?;

    if !staff.is_active {
        return Err(AppError::forbidden("Account has been disabled"));
    }

    Ok(Json(UserInfo {
        id: user.id,
        username: staff.username,
        display_name: staff.display_name,
        email: staff.email,
        role: staff.role,
        permitted_actions: staff.role.permitted_actions(),
    }))
}

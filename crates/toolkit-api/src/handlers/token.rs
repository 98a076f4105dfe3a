use crate::constants::{DEFAULT_TOKEN_LENGTH, MAX_TOKEN_LENGTH};
use crate::error::{HttpAppError, ValidatedQuery};
use axum::Json;
use serde::{Deserialize, Serialize};
use toolkit_core::{random_string, AppError};

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub length: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Generate a random alphanumeric token.
pub async fn create_token(
    ValidatedQuery(query): ValidatedQuery<TokenQuery>,
) -> Result<Json<TokenResponse>, HttpAppError> {
    let length = query.length.unwrap_or(DEFAULT_TOKEN_LENGTH);
    if length > MAX_TOKEN_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "length must be at most {}",
            MAX_TOKEN_LENGTH
        ))
        .into());
    }

    Ok(Json(TokenResponse {
        token: random_string(length),
    }))
}

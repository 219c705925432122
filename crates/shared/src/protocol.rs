use serde::{Deserialize, Serialize};

use crate::domain::User;

pub const SIGN_UP_PATH: &str = "/users";
pub const CURRENT_USER_PATH: &str = "/users/me";
pub const COMPANY_DETAILS_PATH: &str = "/users/me/company-details";

/// Body returned by the create-user and upsert-company-details endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResponse {
    pub fn accepted(user: User) -> Self {
        Self {
            success: true,
            user: Some(user),
            message: None,
        }
    }

    pub fn rejected(message: Option<String>) -> Self {
        Self {
            success: false,
            user: None,
            message,
        }
    }
}

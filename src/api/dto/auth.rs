use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_name.trim().len() < 2 {
            return Err("first_name must be at least 2 chars");
        }
        if let Some(last) = &self.last_name
            && !last.is_empty()
            && last.trim().len() < 2
        {
            return Err("last_name must be at least 2 chars");
        }
        if !looks_like_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.len() < 8 {
            return Err("password must be at least 8 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !looks_like_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

// Format checks stay shallow; the mailbox is the only real validator.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub error: bool,
    pub msg: &'static str,
    pub user: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TokensBody {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub error: bool,
    pub tokens: TokensBody,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub error: bool,
    pub tokens: TokensBody,
}

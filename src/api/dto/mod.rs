pub mod auth;
pub mod orders;
pub mod products;

use serde::Serialize;

/// Generic success/confirmation body, mirroring the error shape.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub error: bool,
    pub msg: &'static str,
}

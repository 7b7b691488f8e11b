use crate::error::AppError;
use crate::models::visit::MAX_IP_LEN;

pub mod admin;
pub mod api;

/// Trimmed search input, rejected when it cannot be a stored address.
fn search_input(raw: Option<String>) -> Result<String, AppError> {
    let ip = raw.unwrap_or_default().trim().to_string();
    if ip.len() > MAX_IP_LEN {
        return Err(AppError::BadRequest(format!(
            "IP address must be at most {MAX_IP_LEN} characters"
        )));
    }
    Ok(ip)
}

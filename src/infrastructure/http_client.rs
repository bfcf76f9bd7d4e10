use std::time::Duration;

use reqwest::{redirect, Client};

use crate::domain::error::{AppError, Result};

/// Redirect hops followed before a fetch is given up.
const MAX_REDIRECTS: usize = 10;

/// Builds the outbound client shared by the Maps-URL resolver and the KML fetcher.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Cuts a response body down for error messages.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

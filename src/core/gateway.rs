use std::time::Duration;

use thiserror::Error;

use crate::core::models::credential::{CredentialRecord, KeyListResponse};

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Provisioning key not configured (set {0} or provider.provisioning_key)")]
    MissingSecret(&'static str),
    #[error("Endpoint must use HTTPS, got: {0}")]
    InsecureEndpoint(String),
    #[error("Request to key listing failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unauthorized (HTTP {0}) - check your provisioning key")]
    Unauthorized(u16),
    #[error("HTTP {status} from key listing: {body}")]
    Status { status: u16, body: String },
    #[error("Key listing returned non-JSON response (content-type: {0})")]
    NotJson(String),
    #[error("Failed to parse key listing: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Everything needed for one key listing request.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub endpoint: String,
    pub secret: String,
    pub timeout: Duration,
    pub include_disabled: bool,
    pub offset: Option<u32>,
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Called before the provisioning key is attached to any request.
pub fn validate_endpoint(url: &str) -> Result<(), RetrievalError> {
    if !url.starts_with("https://") {
        return Err(RetrievalError::InsecureEndpoint(url.to_string()));
    }
    Ok(())
}

fn query_params(opts: &GatewayOptions) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if opts.include_disabled {
        params.push(("include_disabled", "true".to_string()));
    }
    if let Some(offset) = opts.offset {
        params.push(("offset", offset.to_string()));
    }
    params
}

/// Decode a key listing body. A missing `data` array yields an empty list.
pub fn parse_key_list(
    content_type: Option<&str>,
    body: &str,
) -> Result<Vec<CredentialRecord>, RetrievalError> {
    match content_type {
        Some(ct) if ct.contains("application/json") => {}
        other => {
            return Err(RetrievalError::NotJson(
                other.unwrap_or("missing").to_string(),
            ))
        }
    }
    let response: KeyListResponse = serde_json::from_str(body)?;
    Ok(response.data)
}

/// Fetch every key visible to the provisioning key with a single GET.
pub async fn fetch_key_list(opts: &GatewayOptions) -> Result<Vec<CredentialRecord>, RetrievalError> {
    validate_endpoint(&opts.endpoint)?;

    let client = reqwest::Client::builder().timeout(opts.timeout).build()?;

    tracing::debug!(endpoint = %opts.endpoint, include_disabled = opts.include_disabled, "fetching key list");

    let response = client
        .get(&opts.endpoint)
        .query(&query_params(opts))
        .bearer_auth(&opts.secret)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RetrievalError::Unauthorized(status.as_u16()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RetrievalError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    let records = parse_key_list(content_type.as_deref(), &body)?;
    tracing::debug!(count = records.len(), "key list received");
    Ok(records)
}

//! HTTP plumbing shared by the Gemini and relay clients.

use serde::Deserialize;

use engvantage_core::error::GatewayError;

/// Client-side request timeout. The boundary has no specified timeout of
/// its own.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
}

/// Map a transport failure to a gateway error.
pub(crate) fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(REQUEST_TIMEOUT_SECS)
    } else {
        GatewayError::Network(e.to_string())
    }
}

/// Map non-success statuses to the gateway error taxonomy, passing a
/// successful response through.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status().as_u16();
    if status == 429 {
        let message = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(|s| format!("retry after {s}s"))
            .unwrap_or_else(|| "retry later".to_string());
        return Err(GatewayError::RateLimited { message });
    }
    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::AuthenticationFailed(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(GatewayError::ApiError { status, message });
    }
    Ok(response)
}

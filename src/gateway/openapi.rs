//! OpenAPI document
//!
//! Served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::gateway::types::{HealthResponse, JettonTransferRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jetton Airdrop API",
        version = "0.1.0",
        description = "One-shot jetton transfers on TON with settlement confirmation pushed to Telegram.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::jetton_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            JettonTransferRequest,
        )
    ),
    tags(
        (name = "System", description = "Service health"),
        (name = "Jetton", description = "Airdrop requests"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_paths() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/jetton/transfer"));
        assert!(json.contains("/api/v1/health"));
        assert!(json.contains("JettonTransferRequest"));
    }
}

//! Provisioning function entry point. This is the only binary that reads the
//! service-role key and builds a privileged client.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use school_admin::utils::logger;
use school_admin::{
    PrivilegedClient, ProvisioningHandler, ProvisioningService, RequestValidator, ServerConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API Gateway (`httpMethod`) or Function URL (`requestContext.http.method`) event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub http_method: Option<String>,
    pub request_context: Option<RequestContext>,
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Deserialize)]
pub struct RequestContext {
    pub http: Option<HttpContext>,
}

#[derive(Debug, Deserialize)]
pub struct HttpContext {
    pub method: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Request {
    fn method(&self) -> &str {
        self.http_method
            .as_deref()
            .or_else(|| {
                self.request_context
                    .as_ref()
                    .and_then(|c| c.http.as_ref())
                    .and_then(|h| h.method.as_deref())
            })
            // 直接 invoke 時沒有 HTTP 資訊，視為 POST
            .unwrap_or("POST")
    }
}

async fn function_handler(
    handler: &ProvisioningHandler<PrivilegedClient>,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    let request = event.payload;
    tracing::info!(
        "Provisioning request {} ({})",
        event.context.request_id,
        request.method()
    );

    let body = if request.is_base64_encoded {
        tracing::warn!("Rejecting base64-encoded body");
        Some("")
    } else {
        request.body.as_deref()
    };

    let response = handler.handle(request.method(), body).await;
    tracing::info!("Responding with status {}", response.status);

    Ok(Response {
        status_code: response.status,
        headers: response.headers,
        body: response.body,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 缺少 service-role key 時直接結束，不以受限模式啟動
    let config = ServerConfig::from_env().map_err(|e| {
        tracing::error!("❌ Refusing to start: {}", e);
        e
    })?;
    let client = config.privileged_client()?;
    tracing::info!("Provisioning function ready for {}", client.endpoint());

    let service = ProvisioningService::new(
        client,
        RequestValidator::new(config.password_policy()),
        config.timeout(),
    );
    let handler = ProvisioningHandler::new(service, config.allowed_origin.clone());
    let handler = &handler;

    run(service_fn(move |event: LambdaEvent<Request>| async move {
        function_handler(handler, event).await
    }))
    .await
}

use aqua_proxy_shared::{proxy, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

/// Main Lambda handler - answers CORS preflight and hands POSTs to the proxy
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!(
        "Aqua proxy invoked - Method: {} Path: {}",
        method,
        event.uri().path()
    );

    match method {
        &Method::OPTIONS => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .map_err(Box::new)?),
        &Method::POST => proxy::proxy(&state, event.body()).await,
        _ => Ok(Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(
                serde_json::json!({"message": "Method not allowed."})
                    .to_string()
                    .into(),
            )
            .map_err(Box::new)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqua_proxy_shared::config::Config;
    use aqua_proxy_shared::origin::{Origin, OriginError, OriginResponse};
    use aqua_proxy_shared::store::MemoryBlobStore;
    use aqua_proxy_shared::types::{TargetUrl, NO_URL_MESSAGE};
    use async_trait::async_trait;
    use lambda_http::http::{HeaderMap, Request as HttpRequest};

    /// Origin that must never be reached
    struct UnreachableOrigin;

    #[async_trait]
    impl Origin for UnreachableOrigin {
        async fn fetch(
            &self,
            method: Method,
            target: &TargetUrl,
        ) -> Result<OriginResponse, OriginError> {
            panic!("unexpected {} {}", method, target)
        }
    }

    /// Origin answering every request with a fixed ETag
    struct StaticOrigin;

    #[async_trait]
    impl Origin for StaticOrigin {
        async fn fetch(
            &self,
            _method: Method,
            _target: &TargetUrl,
        ) -> Result<OriginResponse, OriginError> {
            let mut headers = HeaderMap::new();
            headers.insert("etag", "\"5f1e-3a\"".parse().unwrap());
            Ok(OriginResponse {
                status: StatusCode::OK,
                headers,
                body: b"launcherlist".to_vec(),
            })
        }
    }

    fn state(origin: Arc<dyn Origin>) -> Arc<AppState> {
        AppState::new(
            Config::new("aqua-bucket", "aqua-bucket.s3.amazonaws.com"),
            Arc::new(MemoryBlobStore::new()),
            origin,
        )
    }

    fn request(method: Method, body: &str) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri("https://api.example.com/prod/aqua-proxy")
            .body(Body::from(body))
            .unwrap()
    }

    fn text(response: &Response<Body>) -> &str {
        match response.body() {
            Body::Text(text) => text,
            _ => "",
        }
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = function_handler(request(Method::OPTIONS, ""), state(Arc::new(UnreachableOrigin)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers()["Access-Control-Allow-Methods"], "POST,OPTIONS");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = function_handler(request(Method::GET, ""), state(Arc::new(UnreachableOrigin)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_post_without_url() {
        let response = function_handler(request(Method::POST, "{}"), state(Arc::new(UnreachableOrigin)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(text(&response)).unwrap();
        assert_eq!(body["message"], NO_URL_MESSAGE);
    }

    #[tokio::test]
    async fn test_post_returns_bucket_url() {
        let response = function_handler(
            request(
                Method::POST,
                r#"{"url": "http://download.pso2.jp/patch_prod/v2/launcherlist.txt"}"#,
            ),
            state(Arc::new(StaticOrigin)),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(text(&response)).unwrap();
        assert_eq!(body["result"], "https://aqua-bucket.s3.amazonaws.com/5f1e-3a");
    }
}

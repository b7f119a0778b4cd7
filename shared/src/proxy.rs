use lambda_http::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use lambda_http::{Body, Error, Response};

use crate::origin::OriginResponse;
use crate::types::{cache_key, MessageBody, ProxyRequest, ResultBody, INTERNAL_ERROR_MESSAGE};
use crate::AppState;

/// Fetch a patch file through the bucket cache and point the caller at it.
///
/// A HEAD to the origin yields the ETag that names the cached object. If the
/// object is already in the bucket the origin is not downloaded again;
/// otherwise the file is fetched with GET and uploaded. Either way the caller
/// gets `{"result": "<public URL>"}` with the origin's status and headers.
///
/// Origin statuses are relayed as they are, and an error page from the
/// origin is cached like any other body. Network failures talking to the
/// origin are returned as `Err`.
pub async fn proxy(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    let body_str = match body {
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    };

    let request = match ProxyRequest::parse(body_str) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Rejected request ({}); body: {}", e, body_str);
            return message_response(StatusCode::BAD_REQUEST, e.message());
        }
    };
    let target = &request.target;

    tracing::info!("Making request to {}", target);
    let head = state.origin.fetch(Method::HEAD, target).await?;
    tracing::info!("Response status: {}", head.status);

    let key = cache_key(head.etag());
    let url = state.config.public_url(&key);

    match state.store.exists(&key).await {
        Ok(true) => {
            tracing::info!("Cache hit for {}", key);
            return result_response(head.status, head.headers, &url);
        }
        Ok(false) => tracing::info!("Cache miss for {}", key),
        Err(e) => {
            tracing::error!("Failed to check cache: {}", e);
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
        }
    }

    let OriginResponse {
        status,
        headers,
        body,
    } = state.origin.fetch(Method::GET, target).await?;
    tracing::info!("Response status: {} ({} bytes)", status, body.len());

    if let Err(e) = state.store.put(&key, body).await {
        tracing::error!("Failed to cache {}: {}", target, e);
        return message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
    }

    result_response(status, headers, &url)
}

/// JSON error body with wildcard CORS
fn message_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&MessageBody::new(message))?.into())
        .map_err(Box::new)?)
}

/// Origin status and headers around a `{"result": url}` body
fn result_response(
    status: StatusCode,
    mut headers: HeaderMap,
    url: &str,
) -> Result<Response<Body>, Error> {
    strip_framing_headers(&mut headers);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    let body = ResultBody {
        result: url.to_string(),
    };
    let mut response = Response::builder()
        .status(status)
        .body(serde_json::to_string(&body)?.into())
        .map_err(Box::new)?;
    *response.headers_mut() = headers;

    Ok(response)
}

/// The body is replaced, so headers describing the origin body's framing no
/// longer apply.
fn strip_framing_headers(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    headers.remove("keep-alive");
}

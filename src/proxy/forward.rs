use axum::{
    body::{Body, Bytes},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            CONTENT_LENGTH,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    response::Response,
};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{
    settings::{ProxySettings, UpstreamSettings},
    ProxyNamespace,
};
use crate::proxy::error::ProxyError;

/// An incoming request, reduced to what gets forwarded.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path below the namespace, without a leading slash.
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Forwards requests to an upstream with a header allow-list and CORS.
pub struct Forwarder {
    client: reqwest::Client,
    forwarded_request_headers: Vec<HeaderName>,
    stripped_response_headers: Vec<HeaderName>,
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

fn header_names(names: &[String]) -> Result<Vec<HeaderName>, ProxyError> {
    names
        .iter()
        .map(|n| {
            HeaderName::from_bytes(n.as_bytes())
                .map_err(|e| ProxyError::Config(format!("bad header name {:?}: {}", n, e)))
        })
        .collect()
}

fn header_value(value: &str) -> Result<HeaderValue, ProxyError> {
    HeaderValue::from_str(value)
        .map_err(|e| ProxyError::Config(format!("bad header value {:?}: {}", value, e)))
}

impl Forwarder {
    pub fn new(proxy: &ProxySettings, upstream: &UpstreamSettings) -> Result<Self, ProxyError> {
        let mut builder = reqwest::Client::builder().user_agent(upstream.user_agent.clone());
        if let Some(seconds) = upstream.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            forwarded_request_headers: header_names(&proxy.forwarded_request_headers)?,
            stripped_response_headers: header_names(&proxy.stripped_response_headers)?,
            allow_origin: header_value(&proxy.cors_allow_origin)?,
            allow_methods: header_value(&proxy.cors_allow_methods.join(","))?,
            allow_headers: header_value(&proxy.cors_allow_headers.join(", "))?,
        })
    }

    pub fn apply_cors(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }

    /// `204 No Content` with CORS headers; upstream is not contacted.
    pub fn preflight(&self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply_cors(response.headers_mut());
        response
    }

    pub fn request_headers(&self, incoming: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in &self.forwarded_request_headers {
            if let Some(value) = incoming.get(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }

    pub fn response_headers(&self, upstream: &HeaderMap) -> HeaderMap {
        let mut headers = upstream.clone();
        for name in &self.stripped_response_headers {
            headers.remove(name);
        }
        // The body is re-framed locally.
        headers.remove(CONTENT_LENGTH);
        self.apply_cors(&mut headers);
        headers
    }

    pub fn target_url(namespace: &ProxyNamespace, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", namespace.upstream, path.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub async fn forward(&self, namespace: &ProxyNamespace, request: ForwardRequest) -> Result<Response, ProxyError> {
        if request.method == Method::OPTIONS {
            return Ok(self.preflight());
        }

        let target = Self::target_url(namespace, &request.path, request.query.as_deref());
        debug!("{} {} -> {}", request.method, request.path, target);

        let failure_status =
            StatusCode::from_u16(namespace.failure_status).unwrap_or(StatusCode::BAD_GATEWAY);
        let upstream_failed = |e: reqwest::Error| {
            warn!("Proxy to {} failed: {}", target, e);
            ProxyError::Upstream {
                status: failure_status,
                detail: e.to_string(),
            }
        };

        let mut outgoing = self
            .client
            .request(request.method.clone(), &target)
            .headers(self.request_headers(&request.headers));
        if !matches!(request.method, Method::GET | Method::HEAD) {
            outgoing = outgoing.body(request.body);
        }

        let upstream = outgoing.send().await.map_err(upstream_failed)?;
        let status = upstream.status();
        let headers = self.response_headers(upstream.headers());
        let body = upstream.bytes().await.map_err(upstream_failed)?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

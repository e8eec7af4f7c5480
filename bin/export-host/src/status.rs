//! HTTP status surface of the export host

use export_api::EndpointDescription;
use export_core::{ExportMetrics, ExportRegistry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared state behind the status endpoints
pub struct StatusService {
    registry: Arc<ExportRegistry>,
    metrics: ExportMetrics,
}

impl StatusService {
    pub fn new(registry: Arc<ExportRegistry>, metrics: ExportMetrics) -> Self {
        Self { registry, metrics }
    }

    pub async fn handle<B>(
        self: Arc<Self>,
        req: Request<B>,
    ) -> Result<Response<Full<Bytes>>, hyper::Error> {
        Ok(self.route(req.method(), req.uri().path()))
    }

    /// Answer a request for `path`
    pub fn route(&self, method: &Method, path: &str) -> Response<Full<Bytes>> {
        debug!("{} {}", method, path);

        if method != Method::GET {
            return text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed\n");
        }

        match path {
            "/healthz" => {
                if self.registry.is_valid() {
                    text(StatusCode::OK, "OK\n")
                } else {
                    text(StatusCode::SERVICE_UNAVAILABLE, "Stopped\n")
                }
            }
            "/metrics" => match self.metrics.gather() {
                Ok(body) => {
                    let mut response = text(StatusCode::OK, body);
                    response.headers_mut().insert(
                        CONTENT_TYPE,
                        HeaderValue::from_static("text/plain; version=0.0.4"),
                    );
                    response
                }
                Err(e) => {
                    warn!("Failed to gather metrics: {}", e);
                    text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to gather metrics\n")
                }
            },
            "/exports" => match serde_json::to_vec(&self.exports()) {
                Ok(body) => {
                    let mut response = text(StatusCode::OK, body);
                    response
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    response
                }
                Err(e) => {
                    warn!("Failed to encode exports: {}", e);
                    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n")
                }
            },
            _ => text(StatusCode::NOT_FOUND, "Not Found\n"),
        }
    }

    /// Live endpoint descriptions ordered by service id
    fn exports(&self) -> Vec<EndpointDescription> {
        let mut exports: Vec<_> = self
            .registry
            .get_all_export_references()
            .into_iter()
            .map(|r| r.exported_endpoint().clone())
            .collect();
        exports.sort_by_key(|d| d.service_id);
        exports
    }
}

fn text(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

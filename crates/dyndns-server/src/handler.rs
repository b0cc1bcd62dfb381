//! DynDNS protocol handler

use crate::protocol::{
    RequestForm, ResponseStatus, UpdateIntent, UpdateParams, extract_hostname,
    normalize_hostname, render_response, resolve_client_ip, split_hostname,
};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use dyndns_core::{DnsRecord, Error};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// `GET /health`
pub async fn health() -> Response {
    text_response(StatusCode::OK, "OK\n".to_string())
}

/// Handle an update request in either form
pub async fn handle_update(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    tracing::debug!(method = %request.method(), %path, remote = ?remote, "received request");

    if request.method() != Method::GET {
        tracing::warn!(method = %request.method(), remote = ?remote, "method not allowed");
        return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n".to_string());
    }

    let form = RequestForm::from_path(&path);
    let params = UpdateParams::from_query(request.uri().query());

    let Some(raw) = extract_hostname(form, &path, params.hostname.as_deref()) else {
        tracing::warn!(remote = ?remote, "no hostname in request");
        return respond(form, ResponseStatus::NotFqdn, None);
    };
    let hostname = normalize_hostname(&raw);

    let Some((domain, subdomain)) = split_hostname(&hostname) else {
        tracing::warn!(%hostname, "hostname cannot be split into domain and subdomain");
        return respond(form, ResponseStatus::NotFqdn, None);
    };

    let forwarded_for = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());

    let Some(ip) = resolve_client_ip(params.myip.as_deref(), forwarded_for, remote) else {
        tracing::error!(%hostname, "no valid client IP address in request");
        return respond(form, ResponseStatus::ServerError, None);
    };

    let intent = UpdateIntent::from_parts(domain, subdomain, ip);

    tracing::debug!(
        domain = %intent.domain,
        subdomain = %intent.subdomain,
        record_type = %intent.record_type,
        %ip,
        "updating DNS record"
    );

    match apply(&state, &intent).await {
        Ok(()) => {
            tracing::info!(hostname = %intent.hostname, %ip, "updated");
            respond(form, ResponseStatus::Good, Some(ip))
        }
        Err(e) => {
            tracing::error!(hostname = %intent.hostname, error = %e, "DNS update failed");
            respond(form, ResponseStatus::ServerError, Some(ip))
        }
    }
}

/// Upsert the record through the provider, bounded by the request timeout
async fn apply(state: &AppState, intent: &UpdateIntent) -> dyndns_core::Result<()> {
    let record = DnsRecord::address(intent.hostname.clone(), intent.ip, state.ttl);

    tokio::time::timeout(
        state.request_timeout,
        state.provider.update_record(&intent.domain, &record),
    )
    .await
    .map_err(|_| {
        Error::timeout(format!(
            "update of {} exceeded {:?}",
            intent.hostname, state.request_timeout
        ))
    })?
}

fn respond(form: RequestForm, status: ResponseStatus, ip: Option<IpAddr>) -> Response {
    text_response(StatusCode::OK, render_response(form, status, ip))
}

fn text_response(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

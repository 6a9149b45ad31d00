/* src/cli/core/src/dev/proxy.rs */

// Reverse proxy to the Vite dev server for everything the virtual router
// does not claim: modules, `/@vite/client`, and the HMR websocket.

use anyhow::Result;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::extract::ws::{Message as ClientMessage, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderName, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

/// Hop-by-hop headers are per connection and never forwarded.
const HOP_BY_HOP: [HeaderName; 4] =
  [header::CONNECTION, header::TRANSFER_ENCODING, header::UPGRADE, header::HOST];

pub(crate) struct ViteProxy {
  origin: String,
  ws_origin: String,
  client: reqwest::Client,
}

impl ViteProxy {
  pub fn new(port: u16) -> Self {
    Self {
      origin: format!("http://localhost:{port}"),
      ws_origin: format!("ws://localhost:{port}"),
      client: reqwest::Client::new(),
    }
  }

  /// Forward an HTTP request, streaming the response body back.
  pub async fn forward(&self, req: Request<Body>) -> Response {
    match self.try_forward(req).await {
      Ok(response) => response,
      Err(status) => (status, format!("vite dev server unavailable at {}", self.origin)).into_response(),
    }
  }

  async fn try_forward(&self, req: Request<Body>) -> Result<Response, StatusCode> {
    let path_and_query = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
    let url = format!("{}{}", self.origin, path_and_query);

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
      .map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut builder = self.client.request(method, &url);
    for (key, value) in req.headers() {
      if !HOP_BY_HOP.contains(key) {
        builder = builder.header(key.as_str(), value.as_bytes());
      }
    }

    let body_bytes =
      axum::body::to_bytes(req.into_body(), usize::MAX).await.map_err(|_| StatusCode::BAD_REQUEST)?;
    if !body_bytes.is_empty() {
      builder = builder.body(body_bytes);
    }

    let upstream = builder.send().await.map_err(|e| {
      tracing::warn!(%url, error = %e, "proxy request failed");
      StatusCode::BAD_GATEWAY
    })?;

    let status =
      StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = Response::builder().status(status);
    for (key, value) in upstream.headers() {
      if !HOP_BY_HOP.iter().any(|h| h.as_str() == key.as_str()) {
        response = response.header(key.as_str(), value.as_bytes());
      }
    }

    let body = Body::from_stream(upstream.bytes_stream());
    response.body(body).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
  }

  /// Accept the client websocket and pipe it to Vite's HMR endpoint,
  /// echoing the subprotocol Vite expects.
  pub async fn tunnel(&self, req: Request<Body>) -> Response {
    let (mut parts, _body) = req.into_parts();
    let protocols = requested_protocols(&parts.headers);
    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
      Ok(ws) => ws,
      Err(rejection) => return rejection.into_response(),
    };
    let path_and_query = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let target = format!("{}{}", self.ws_origin, path_and_query);

    ws.protocols(protocols.clone()).on_upgrade(move |socket| async move {
      if let Err(e) = pipe_websocket(socket, &target, &protocols).await {
        tracing::debug!(%target, error = %e, "websocket tunnel closed");
      }
    })
  }
}

pub(crate) fn is_websocket_upgrade<B>(req: &Request<B>) -> bool {
  req
    .headers()
    .get(header::UPGRADE)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

fn requested_protocols(headers: &axum::http::HeaderMap) -> Vec<String> {
  headers
    .get(header::SEC_WEBSOCKET_PROTOCOL)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect())
    .unwrap_or_default()
}

async fn pipe_websocket(client: WebSocket, target: &str, protocols: &[String]) -> Result<()> {
  let mut request = target.into_client_request()?;
  if !protocols.is_empty() {
    request.headers_mut().insert(header::SEC_WEBSOCKET_PROTOCOL, protocols.join(", ").parse()?);
  }
  let (upstream, _) = tokio_tungstenite::connect_async(request).await?;

  let (mut upstream_tx, mut upstream_rx) = upstream.split();
  let (mut client_tx, mut client_rx) = client.split();

  let client_to_upstream = async {
    while let Some(Ok(msg)) = client_rx.next().await {
      let Some(msg) = to_upstream(msg) else { break };
      if upstream_tx.send(msg).await.is_err() {
        break;
      }
    }
    let _ = upstream_tx.close().await;
  };
  let upstream_to_client = async {
    while let Some(Ok(msg)) = upstream_rx.next().await {
      let Some(msg) = to_client(msg) else { continue };
      if client_tx.send(msg).await.is_err() {
        break;
      }
    }
    let _ = client_tx.close().await;
  };

  tokio::select! {
    () = client_to_upstream => {}
    () = upstream_to_client => {}
  }
  Ok(())
}

/// `None` ends the tunnel.
fn to_upstream(msg: ClientMessage) -> Option<UpstreamMessage> {
  match msg {
    ClientMessage::Text(text) => Some(UpstreamMessage::text(text.as_str().to_owned())),
    ClientMessage::Binary(bytes) => Some(UpstreamMessage::Binary(bytes)),
    ClientMessage::Ping(bytes) => Some(UpstreamMessage::Ping(bytes)),
    ClientMessage::Pong(bytes) => Some(UpstreamMessage::Pong(bytes)),
    ClientMessage::Close(_) => None,
  }
}

/// `None` skips the frame.
fn to_client(msg: UpstreamMessage) -> Option<ClientMessage> {
  match msg {
    UpstreamMessage::Text(text) => Some(ClientMessage::text(text.as_str().to_owned())),
    UpstreamMessage::Binary(bytes) => Some(ClientMessage::Binary(bytes)),
    UpstreamMessage::Ping(bytes) => Some(ClientMessage::Ping(bytes)),
    UpstreamMessage::Pong(bytes) => Some(ClientMessage::Pong(bytes)),
    UpstreamMessage::Close(_) | UpstreamMessage::Frame(_) => None,
  }
}

//! Registry WebSocket client.
//!
//! Connects to a pool registry, performs the `hello`/`welcome` handshake,
//! then exchanges one request frame for one response frame per operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use pool_cli::client::RegistryClient;
//!
//! # async fn example() -> Result<(), pool_cli::StoreError> {
//! let mut client = RegistryClient::connect("ws://localhost:8080").await?;
//! let pools = client.list_pools().await?;
//! println!("{} pool(s)", pools.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pool_proto::{error_codes, Pool, RegistryRequest, RegistryResponse, PROTOCOL_VERSION};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::error::StoreError;
use crate::store::PoolStore;

/// Registry WebSocket client.
pub struct RegistryClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    server_version: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("server_version", &self.server_version)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    /// Connect to the registry at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is invalid (must start with `ws://` or `wss://`)
    /// - Connection fails
    /// - Handshake fails
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        Self::connect_with_timeout(url, DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Connect with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if connection or handshake fails.
    pub async fn connect_with_timeout(
        url: &str,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(StoreError::Config(format!(
                "invalid registry URL: {url}, must start with ws:// or wss://"
            )));
        }

        debug!(url = %url, "Connecting to registry");

        let (ws, _response) = timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| StoreError::Timeout("connection timed out".into()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let mut client = Self {
            ws,
            server_version: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        let hello = RegistryRequest::hello(env!("CARGO_PKG_VERSION"));
        match client.send_request(hello).await? {
            RegistryResponse::Welcome {
                server_version,
                protocol_version,
            } => {
                if protocol_version != PROTOCOL_VERSION {
                    warn!(
                        server = protocol_version,
                        client = PROTOCOL_VERSION,
                        "Protocol version mismatch"
                    );
                }
                client.server_version = server_version;
                debug!(version = %client.server_version, "Handshake complete");
                Ok(client)
            }
            other => Err(StoreError::Protocol(format!(
                "unexpected response to hello: {other:?}"
            ))),
        }
    }

    /// Set the request timeout.
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    /// Get the registry version reported during the handshake.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Send a request and wait for its response.
    ///
    /// Error replies are turned into [`StoreError`]s here, so callers only
    /// see success variants.
    async fn send_request(
        &mut self,
        request: RegistryRequest,
    ) -> Result<RegistryResponse, StoreError> {
        let request_type = request.request_type();
        let json = request.to_json()?;

        trace!(request_type, "Sending request");
        self.ws
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let text = timeout(self.request_timeout, read_text_message(&mut self.ws))
            .await
            .map_err(|_| StoreError::Timeout(format!("request '{request_type}' timed out")))??;

        let response = RegistryResponse::from_json(&text)?;
        trace!(request_type, "Received response");
        match response {
            RegistryResponse::Error { code, message, .. } => Err(map_error(code, message, &request)),
            ok => Ok(ok),
        }
    }

    /// Close the connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(mut self) -> Result<(), StoreError> {
        self.ws
            .close(None)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// List all pools, in registry order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_pools(&mut self) -> Result<Vec<Pool>, StoreError> {
        match self.send_request(RegistryRequest::ListPools).await? {
            RegistryResponse::Pools { pools } => Ok(pools),
            other => Err(unexpected(&other)),
        }
    }

    /// Fetch one pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the pool does not exist.
    pub async fn get_pool(&mut self, name: &str) -> Result<Pool, StoreError> {
        let request = RegistryRequest::GetPool { name: name.to_string() };
        match self.send_request(request).await? {
            RegistryResponse::Pool { pool } => Ok(pool),
            other => Err(unexpected(&other)),
        }
    }

    /// Create or update a pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the registry rejects the pool.
    pub async fn create_pool(
        &mut self,
        name: &str,
        slots: u32,
        description: &str,
    ) -> Result<Pool, StoreError> {
        let request = RegistryRequest::CreatePool {
            name: name.to_string(),
            slots,
            description: description.to_string(),
        };
        match self.send_request(request).await? {
            RegistryResponse::Pool { pool } => Ok(pool),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the pool does not exist.
    pub async fn delete_pool(&mut self, name: &str) -> Result<(), StoreError> {
        let request = RegistryRequest::DeletePool { name: name.to_string() };
        match self.send_request(request).await? {
            RegistryResponse::PoolDeleted { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

impl PoolStore for RegistryClient {
    async fn list(&mut self) -> Result<Vec<Pool>, StoreError> {
        self.list_pools().await
    }

    async fn get(&mut self, name: &str) -> Result<Pool, StoreError> {
        self.get_pool(name).await
    }

    async fn create(&mut self, name: &str, slots: u32, description: &str) -> Result<Pool, StoreError> {
        self.create_pool(name, slots, description).await
    }

    async fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.delete_pool(name).await
    }
}

fn map_error(code: u32, message: String, request: &RegistryRequest) -> StoreError {
    match (code, request) {
        (error_codes::POOL_NOT_FOUND, RegistryRequest::GetPool { name })
        | (error_codes::POOL_NOT_FOUND, RegistryRequest::DeletePool { name }) => {
            StoreError::NotFound(name.clone())
        }
        (error_codes::POOL_NOT_FOUND, _) => StoreError::NotFound(message),
        (error_codes::INVALID_REQUEST, _) => StoreError::Validation(message),
        _ => StoreError::Registry { code, message },
    }
}

/// Read the next text frame, skipping control frames.
async fn read_text_message<S>(ws: &mut S) -> Result<String, StoreError>
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                trace!("Skipping control frame");
            }
            Some(Ok(Message::Binary(_))) => {
                return Err(StoreError::Protocol("unexpected binary message".into()));
            }
            Some(Ok(Message::Close(_))) => {
                return Err(StoreError::Connection("connection closed by server".into()));
            }
            Some(Err(e)) => return Err(StoreError::Connection(e.to_string())),
            None => return Err(StoreError::Connection("connection closed".into())),
        }
    }
}

fn unexpected(response: &RegistryResponse) -> StoreError {
    StoreError::Protocol(format!("unexpected response: {response:?}"))
}

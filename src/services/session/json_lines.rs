use async_stream::stream;
use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::{Command, EventStream, RemoteMessage, SessionClient};
use crate::config::SessionConfig;
use crate::{BridgeError, Result};

/// Session client speaking newline-delimited JSON over TCP.
///
/// After connecting it writes one `hello` line. Every line received afterwards
/// is one remote message; commands go out as one JSON object per line.
pub struct JsonLinesClient {
    endpoint: String,
    client_name: String,
    token: Option<String>,
    writer: Mutex<Option<OwnedWriteHalf>>,
}

impl JsonLinesClient {
    /// Client for `endpoint` (`host:port`)
    pub fn new(endpoint: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_name: client_name.into(),
            token: None,
            writer: Mutex::new(None),
        }
    }

    /// Client configured from the `[session]` section
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.endpoint.clone(), config.client_name.clone())
            .with_token(config.token.clone())
    }

    /// Send `token` in the hello line
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Address this client connects to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn hello(&self) -> RemoteMessage {
        let mut hello = json!({
            "type": "hello",
            "client_name": self.client_name,
        });
        if let Some(token) = &self.token {
            hello["token"] = json!(token);
        }
        hello
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, value: &impl serde::Serialize) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

#[async_trait]
impl SessionClient for JsonLinesClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn connect(&self) -> Result<EventStream> {
        let stream = TcpStream::connect(&self.endpoint)
            .await
            .map_err(|err| BridgeError::remote("connect", err))?;
        let (read_half, mut write_half) = stream.into_split();

        write_line(&mut write_half, &self.hello())
            .await
            .map_err(|err| BridgeError::remote("hello", err))?;

        *self.writer.lock().await = Some(write_half);
        info!("connected to remote session");

        let events = stream! {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<RemoteMessage>(&line) {
                            Ok(message) => yield message,
                            Err(err) => warn!(error = %err, "skipping malformed session line"),
                        }
                    }
                    Ok(None) => {
                        debug!("remote session closed the connection");
                        break;
                    }
                    Err(err) => {
                        warn!(error = %err, "session read failed");
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(events))
    }

    async fn disconnect(&self) -> Result<()> {
        let Some(mut writer) = self.writer.lock().await.take() else {
            return Ok(());
        };

        writer
            .shutdown()
            .await
            .map_err(|err| BridgeError::remote("disconnect", err))?;
        debug!(endpoint = %self.endpoint, "disconnected from remote session");
        Ok(())
    }

    async fn send_command(&self, command: Command) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let Some(writer) = writer.as_mut() else {
            return Err(BridgeError::remote(command.name(), "not connected"));
        };

        write_line(writer, &command)
            .await
            .map_err(|err| BridgeError::remote(command.name(), err))
    }
}

//! Client for the block-info socket.
//!
//! A separate process renders the map and knows which block sits at every
//! coordinate. It answers one lookup per connection over a Unix socket
//! using a small line protocol:
//!
//! ```text
//! -> GET MMP/1.0
//! -> Dimension: overworld
//! -> Coord-X: 120
//! -> Coord-Z: -340
//! ->
//! <- MMP/1.0 200
//! <-
//! <- {"altitude": 64, "block": "minecraft:grass_block"}
//! ```
//!
//! Lines end with `\r\n`. Any deviation from the expected response is
//! treated as "no block".

use std::path::{Path, PathBuf};
use std::time::Duration;

use chronomap_meta::Dimension;
use tracing::{debug, warn};

use crate::config::BlockInfoConfig;

/// Protocol version token.
const PROTOCOL: &str = "MMP/1.0";

/// Block at a map coordinate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// Height of the topmost block.
    pub altitude: i32,
    /// Block identifier, e.g. `minecraft:stone`.
    #[serde(rename = "block")]
    pub block_id: String,
}

/// Failures of a single lookup exchange.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// Connecting, writing or reading failed.
    #[error("block-info socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The exchange did not finish in time.
    #[error("block-info lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with something other than a success status.
    #[error("unexpected status line `{0}`")]
    Status(String),

    /// The response ended before the payload line.
    #[error("response ended early")]
    Truncated,

    /// The payload line is not a valid block description.
    #[error("invalid block payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Unix sockets are not available on this platform.
    #[error("block-info lookups require Unix domain sockets")]
    Unsupported,
}

/// Looks up blocks through the block-info socket.
#[derive(Debug, Clone)]
pub struct BlockInfoClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl BlockInfoClient {
    /// Create a client for the socket at `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &BlockInfoConfig) -> Self {
        Self::new(config.socket_path.clone(), config.timeout())
    }

    /// Path of the socket this client connects to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Look up the block at `(x, z)`, or `None` if the service cannot
    /// answer.
    pub async fn lookup(&self, dimension: Dimension, x: i32, z: i32) -> Option<Block> {
        match self.try_lookup(dimension, x, z).await {
            Ok(block) => Some(block),
            Err(e) => {
                warn!(
                    socket = %self.socket_path.display(),
                    %dimension, x, z,
                    error = %e,
                    "block lookup failed"
                );
                None
            }
        }
    }

    /// Look up the block at `(x, z)`, reporting why a lookup failed.
    pub async fn try_lookup(
        &self,
        dimension: Dimension,
        x: i32,
        z: i32,
    ) -> Result<Block, BlockError> {
        tokio::time::timeout(self.timeout, self.exchange(dimension, x, z))
            .await
            .unwrap_or(Err(BlockError::Timeout(self.timeout)))
    }

    #[cfg(unix)]
    async fn exchange(&self, dimension: Dimension, x: i32, z: i32) -> Result<Block, BlockError> {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
        use tokio::net::UnixStream;

        let mut stream = UnixStream::connect(&self.socket_path).await?;
        stream
            .write_all(encode_request(dimension, x, z).as_bytes())
            .await?;
        stream.flush().await?;

        let mut lines = BufReader::new(stream).lines();

        let status = lines.next_line().await?.ok_or(BlockError::Truncated)?;
        if status != format!("{PROTOCOL} 200") {
            return Err(BlockError::Status(status));
        }

        // Blank separator between status and payload.
        lines.next_line().await?.ok_or(BlockError::Truncated)?;

        let payload = lines.next_line().await?.ok_or(BlockError::Truncated)?;
        let block = serde_json::from_str(&payload)?;
        debug!(%dimension, x, z, ?block, "block lookup answered");
        Ok(block)
    }

    #[cfg(not(unix))]
    async fn exchange(&self, _dimension: Dimension, _x: i32, _z: i32) -> Result<Block, BlockError> {
        Err(BlockError::Unsupported)
    }
}

/// Render the request for one lookup.
pub fn encode_request(dimension: Dimension, x: i32, z: i32) -> String {
    format!(
        "GET {PROTOCOL}\r\nDimension: {}\r\nCoord-X: {x}\r\nCoord-Z: {z}\r\n\r\n",
        dimension.dir_name()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn request_format() {
        assert_eq!(
            encode_request(Dimension::Nether, -5, 12),
            "GET MMP/1.0\r\nDimension: nether\r\nCoord-X: -5\r\nCoord-Z: 12\r\n\r\n"
        );
    }

    #[test]
    fn block_json_shape() {
        let block: Block =
            serde_json::from_str(r#"{"altitude": 64, "block": "minecraft:stone"}"#).unwrap();
        assert_eq!(block.altitude, 64);
        assert_eq!(block.block_id, "minecraft:stone");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["block"], "minecraft:stone");
    }

    #[tokio::test]
    async fn missing_socket_is_no_block() {
        let dir = tempfile::tempdir().unwrap();
        let client = BlockInfoClient::new(dir.path().join("absent.sock"), Duration::from_secs(1));
        assert!(client.lookup(Dimension::Overworld, 0, 0).await.is_none());
    }
}

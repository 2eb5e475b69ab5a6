//! Connection handling
//!
//! Manages individual client connections, parsing RESP requests
//! and sending responses.

use crate::dispatch::Dispatcher;
use crate::protocol::{RespEncoder, RespParser, RespValue};
use anyhow::anyhow;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Connection handler
///
/// Works over any ordered, reliable byte stream.
pub struct Connection<S> {
    /// Client stream
    stream: S,

    /// Read buffer
    read_buffer: BytesMut,

    /// Keeps the scan position of a partially received request
    parser: RespParser,

    /// Write buffer
    write_buffer: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new connection handler
    pub fn new(stream: S) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            parser: RespParser::new(),
            write_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Handle the connection
    ///
    /// Requests are answered one at a time, in arrival order. Returns Ok on a
    /// clean close and Err when the peer vanished mid-frame or sent bytes that
    /// are not RESP; in both cases no further reply is written.
    pub async fn handle(&mut self, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
        loop {
            // Answer every complete request already buffered
            loop {
                match self.parser.parse(&mut self.read_buffer) {
                    Ok(Some(request)) => {
                        debug!("Parsed request: {}", request);

                        let response = dispatcher.dispatch(request);

                        debug!("Response: {}", response);

                        self.send_response(&response).await?;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Protocol error: {}", e);
                        return Err(e.into());
                    }
                }
            }

            // Read data from the stream
            let n = self.stream.read_buf(&mut self.read_buffer).await?;

            // Connection closed
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(());
                } else {
                    return Err(anyhow!("connection reset by peer"));
                }
            }

            debug!("Read {} bytes", n);
        }
    }

    /// Send a response to the client
    async fn send_response(&mut self, response: &RespValue) -> anyhow::Result<()> {
        // Encode the response
        self.write_buffer.clear();
        RespEncoder::encode_to(&mut self.write_buffer, response);

        // Write to the stream
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;

        Ok(())
    }
}

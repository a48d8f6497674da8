//! Key-value client.
//!
//! A minimal RESP2 client for the cluster's Redis-compatible listener. It
//! consumes a [`ConnectionConfig`] and speaks one request at a time.

pub mod resp;

use crate::core::config::ConnectionConfig;
use crate::core::error::{CtlError, CtlResult};
use crate::net::dial::{AsyncStream, Connection, Dialer};
use bytes::{Buf, Bytes, BytesMut};
use resp::{encode_command, ParseResult, RespParser, RespValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Connected key-value client.
pub struct KvClient {
    endpoint: String,
    stream: Box<dyn AsyncStream>,
    buf: BytesMut,
    parser: RespParser,
}

impl KvClient {
    /// Dial the configured endpoints and return a client for the first
    /// one that accepts.
    pub async fn connect(config: &ConnectionConfig) -> CtlResult<Self> {
        let dialer = Dialer::new(config)?;
        let conn = dialer.dial(&config.endpoints).await?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already established connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            endpoint: conn.endpoint.clone(),
            stream: conn.into_stream(),
            buf: BytesMut::with_capacity(4096),
            parser: RespParser::new(),
        }
    }

    /// Endpoint this client is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check the server responds.
    pub async fn ping(&mut self) -> CtlResult<()> {
        match self.request(&[b"PING".as_slice()]).await? {
            RespValue::SimpleString(s) if s == "PONG" => Ok(()),
            other => Err(unexpected("PING", &other)),
        }
    }

    /// Store `value` under `key`.
    pub async fn put(&mut self, key: &[u8], value: &[u8]) -> CtlResult<()> {
        match self.request(&[b"SET".as_slice(), key, value]).await? {
            RespValue::SimpleString(s) if s == "OK" => Ok(()),
            other => Err(unexpected("SET", &other)),
        }
    }

    /// Fetch the value stored under `key`.
    pub async fn get(&mut self, key: &[u8]) -> CtlResult<Option<Bytes>> {
        match self.request(&[b"GET".as_slice(), key]).await? {
            RespValue::BulkString(value) => Ok(Some(value)),
            RespValue::Null => Ok(None),
            other => Err(unexpected("GET", &other)),
        }
    }

    /// Delete `key`, returning how many keys were removed.
    pub async fn delete(&mut self, key: &[u8]) -> CtlResult<i64> {
        match self.request(&[b"DEL".as_slice(), key]).await? {
            RespValue::Integer(n) => Ok(n),
            other => Err(unexpected("DEL", &other)),
        }
    }

    async fn request(&mut self, args: &[&[u8]]) -> CtlResult<RespValue> {
        self.stream.write_all(&encode_command(args)).await?;
        self.stream.flush().await?;

        let reply = self.read_reply().await?;
        if let RespValue::Error { kind, message } = reply {
            return Err(CtlError::Server { kind, message });
        }
        Ok(reply)
    }

    async fn read_reply(&mut self) -> CtlResult<RespValue> {
        loop {
            let (result, consumed) = self.parser.parse(&self.buf);
            match result {
                ParseResult::Ok(value) => {
                    self.buf.advance(consumed);
                    return Ok(value);
                }
                ParseResult::Error(message) => return Err(CtlError::protocol(message)),
                ParseResult::Incomplete => {}
            }

            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Err(CtlError::protocol(format!(
                    "{} closed the connection mid-reply",
                    self.endpoint
                )));
            }
        }
    }
}

fn unexpected(command: &str, reply: &RespValue) -> CtlError {
    CtlError::protocol(format!("unexpected {} reply: {:?}", command, reply))
}

//! AOF reader
//!
//! Loads the AOF file and decodes the logged requests.

use crate::protocol::{RespParser, RespValue};
use bytes::BytesMut;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// AOF reader
pub struct AofReader {
    data: BytesMut,
}

impl AofReader {
    /// Load AOF file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read(path)?;
        Ok(AofReader { data: BytesMut::from(&data[..]) })
    }

    /// Parse all requests from the AOF
    ///
    /// Decoding stops at the first corrupt frame or at a truncated tail (a
    /// crash mid-append); everything before it is returned.
    pub fn parse_entries(&self) -> Vec<RespValue> {
        let mut buf = self.data.clone();
        let mut parser = RespParser::new();
        let mut entries = Vec::new();

        loop {
            match parser.parse(&mut buf) {
                Ok(Some(value)) => entries.push(value),
                Ok(None) => {
                    if !buf.is_empty() {
                        warn!("AOF ends with a truncated frame ({} bytes ignored)", buf.len());
                    }
                    break;
                }
                Err(e) => {
                    let position = self.data.len() - buf.len();
                    error!("Failed to parse AOF entry at position {}: {}", position, e);
                    break;
                }
            }
        }

        info!("AOF loaded: {} entries", entries.len());
        entries
    }
}

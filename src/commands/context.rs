//! Command execution context

use crate::protocol::RespValue;
use crate::store::Engine;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;

/// How counts and list elements are framed in replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStyle {
    /// Counts as `+Integer(n)`, list elements as simple strings when they
    /// fit on one line
    #[default]
    Legacy,
    /// Counts as `:n`, list elements as bulk strings
    Resp2,
}

/// Context provided to commands during execution
///
/// Cloning is cheap: the engine is shared, not copied.
#[derive(Clone)]
pub struct CommandContext {
    /// The shared data engine
    pub engine: Arc<Engine>,

    /// Reply framing for counts and list elements
    pub reply_style: ReplyStyle,
}

impl CommandContext {
    /// Create a context over a fresh engine
    pub fn new() -> Self {
        Self::with_engine(Arc::new(Engine::new()))
    }

    pub fn with_engine(engine: Arc<Engine>) -> Self {
        CommandContext {
            engine,
            reply_style: ReplyStyle::default(),
        }
    }

    pub fn with_reply_style(mut self, reply_style: ReplyStyle) -> Self {
        self.reply_style = reply_style;
        self
    }

    /// Reply carrying a count (list length)
    pub fn count_reply(&self, n: usize) -> RespValue {
        match self.reply_style {
            ReplyStyle::Legacy => RespValue::raw(format!("+Integer({})\r\n", n)),
            ReplyStyle::Resp2 => RespValue::integer(n as i64),
        }
    }

    /// Reply carrying a single list element
    ///
    /// A simple string cannot carry CR, LF or non UTF-8 bytes, so such
    /// elements are sent as bulk strings in every style.
    pub fn element_reply(&self, value: Bytes) -> RespValue {
        let fits_one_line = !value.iter().any(|&b| b == b'\r' || b == b'\n');

        if self.reply_style == ReplyStyle::Legacy && fits_one_line {
            if let Ok(text) = std::str::from_utf8(&value) {
                return RespValue::simple_string(text);
            }
        }
        RespValue::bulk_string(value)
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_element_reply() {
        let ctx = CommandContext::new();

        assert_eq!(ctx.element_reply(Bytes::from("a")), RespValue::simple_string("a"));
        assert_eq!(
            ctx.element_reply(Bytes::from("a\r\n+injected")),
            RespValue::bulk_string("a\r\n+injected")
        );
        assert_eq!(ctx.element_reply(Bytes::from("a\nb")), RespValue::bulk_string("a\nb"));
        assert_eq!(
            ctx.element_reply(Bytes::from_static(&[0xff, 0xfe])),
            RespValue::bulk_string(Bytes::from_static(&[0xff, 0xfe]))
        );
    }

    #[test]
    fn test_resp2_element_reply_is_always_bulk() {
        let ctx = CommandContext::new().with_reply_style(ReplyStyle::Resp2);
        assert_eq!(ctx.element_reply(Bytes::from("a")), RespValue::bulk_string("a"));
    }

    #[test]
    fn test_count_reply() {
        assert_eq!(CommandContext::new().count_reply(3), RespValue::raw("+Integer(3)\r\n"));
        assert_eq!(
            CommandContext::new().with_reply_style(ReplyStyle::Resp2).count_reply(3),
            RespValue::integer(3)
        );
    }
}

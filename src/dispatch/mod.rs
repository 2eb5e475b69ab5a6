//! Command dispatcher
//!
//! Routes incoming requests to the appropriate handler.
//! This module provides loose coupling between the server and command implementations.

use crate::aof::{replay_entries, AofConfig, AofReader, AofWriter, CommandLog};
use crate::commands::{CommandContext, CommandError, CommandRegistry, CommandSpec};
use crate::protocol::RespValue;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Command dispatcher
///
/// Shared by every connection. It holds no lock of its own: each table in
/// the engine is guarded separately.
pub struct Dispatcher {
    /// Command registry
    registry: CommandRegistry,

    /// Command execution context
    context: CommandContext,

    /// Durability log for write commands
    log: Option<Arc<dyn CommandLog>>,
}

impl Dispatcher {
    /// Create a dispatcher over a fresh engine, without a log
    pub fn new() -> Self {
        Self::with_context(CommandContext::new())
    }

    pub fn with_context(context: CommandContext) -> Self {
        Dispatcher {
            registry: CommandRegistry::new(),
            context,
            log: None,
        }
    }

    /// Create a dispatcher with AOF support
    ///
    /// An existing AOF is replayed into the context before the writer is
    /// attached, so replayed requests are not logged twice.
    pub fn with_aof(context: CommandContext, config: &AofConfig) -> std::io::Result<Self> {
        let mut dispatcher = Self::with_context(context);

        if !config.enabled {
            info!("AOF disabled");
            return Ok(dispatcher);
        }

        if config.path.exists() {
            info!("Loading AOF from {:?}", config.path);
            match AofReader::load(&config.path) {
                Ok(reader) => {
                    let entries = reader.parse_entries();
                    let replayed = replay_entries(&dispatcher, entries);
                    info!("Replayed {} entries from AOF", replayed);
                }
                Err(e) => warn!("Failed to load AOF: {}", e),
            }
        }

        let writer = AofWriter::new(&config.path, config.sync_policy)?;
        dispatcher.set_log(Arc::new(writer));
        info!("AOF writer initialized at {:?}", config.path);

        Ok(dispatcher)
    }

    /// Set the durability log
    pub fn set_log(&mut self, log: Arc<dyn CommandLog>) {
        self.log = Some(log);
    }

    /// Dispatch a request
    ///
    /// Takes a RESP value (expected to be an array of bulk strings), extracts
    /// the command name and arguments, then routes to the appropriate handler.
    /// Always produces exactly one reply.
    pub fn dispatch(&self, request: RespValue) -> RespValue {
        self.run(&request, true).unwrap_or_else(|e| e.to_resp())
    }

    /// Execute a request without appending it to the log
    pub fn execute_unlogged(&self, request: &RespValue) -> Result<RespValue, CommandError> {
        self.run(request, false)
    }

    /// Flush the durability log; called when a connection ends
    pub fn close_log(&self) {
        if let Some(log) = &self.log {
            if let Err(e) = log.close() {
                warn!("Failed to close AOF: {}", e);
            }
        }
    }

    /// Get reference to the context (for testing/inspection)
    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    fn run(&self, request: &RespValue, log: bool) -> Result<RespValue, CommandError> {
        let (command, args) = self.resolve(request)?;

        debug!("Dispatching command: {} ({} args)", command.name, args.len());

        if log && command.logged {
            if let Some(writer) = &self.log {
                writer.append(request).map_err(|e| {
                    warn!("Failed to write to AOF: {}", e);
                    CommandError::Log(e.to_string())
                })?;
            }
        }

        (command.handler)(&self.context, args)
    }

    /// Look up the command and validate its argument count
    fn resolve<'a>(
        &self,
        request: &'a RespValue,
    ) -> Result<(&'static CommandSpec, &'a [RespValue]), CommandError> {
        let parts = match request.as_array() {
            Some(arr) if !arr.is_empty() => arr,
            Some(_) => return Err(CommandError::InvalidRequest("empty command array")),
            None => return Err(CommandError::InvalidRequest("expected array")),
        };

        // First element is the command name
        let name = parts[0]
            .as_bulk_string()
            .ok_or(CommandError::InvalidRequest("command name must be a bulk string"))?;
        let name = String::from_utf8_lossy(name);

        let command = match self.registry.get(&name) {
            Some(command) => command,
            None => {
                warn!("Unknown command: {}", name);
                return Err(CommandError::UnknownCommand(name.into_owned()));
            }
        };

        let args = &parts[1..];
        if !command.arity.accepts(args.len()) {
            return Err(CommandError::WrongArity(command.name.to_lowercase()));
        }

        // Checked here so a malformed write never reaches the log
        if args.iter().any(|arg| arg.as_bulk_string().is_none()) {
            return Err(CommandError::InvalidRequest("arguments must be bulk strings"));
        }

        Ok((command, args))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ReplyStyle;
    use crate::protocol::{RespEncoder, RespParser};
    use bytes::{Bytes, BytesMut};
    use std::io;
    use std::sync::Mutex;

    /// In-memory log recording every append
    #[derive(Default)]
    struct RecordingLog {
        entries: Mutex<Vec<RespValue>>,
        closed: Mutex<usize>,
    }

    impl CommandLog for RecordingLog {
        fn append(&self, request: &RespValue) -> io::Result<()> {
            self.entries.lock().unwrap().push(request.clone());
            Ok(())
        }

        fn close(&self) -> io::Result<()> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct FailingLog;

    impl CommandLog for FailingLog {
        fn append(&self, _request: &RespValue) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn close(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_set_get() {
        let dispatcher = Dispatcher::new();

        let result = dispatcher.dispatch(RespValue::command(["SET", "mykey", "myvalue"]));
        assert_eq!(result, RespValue::simple_string("OK"));

        let result = dispatcher.dispatch(RespValue::command(["get", "mykey"]));
        assert_eq!(result, RespValue::bulk_string(Bytes::from("myvalue")));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let dispatcher = Dispatcher::new();

        let result = dispatcher.dispatch(RespValue::command(["UNKNOWN"]));
        assert_eq!(result, RespValue::error("ERR unknown command 'UNKNOWN'"));
    }

    #[test]
    fn test_dispatch_wrong_arity() {
        let dispatcher = Dispatcher::new();

        let result = dispatcher.dispatch(RespValue::command(["GET"]));
        assert_eq!(result, RespValue::error("ERR wrong number of arguments for 'get' command"));

        let result = dispatcher.dispatch(RespValue::command(["SET", "k", "v", "extra"]));
        assert!(result.is_error());
        assert_eq!(dispatcher.context().engine.get(b"k"), None);
    }

    #[test]
    fn test_dispatch_rejects_non_array() {
        let dispatcher = Dispatcher::new();

        assert!(dispatcher.dispatch(RespValue::bulk_string("PING")).is_error());
        assert!(dispatcher.dispatch(RespValue::array(vec![])).is_error());
        assert!(dispatcher.dispatch(RespValue::array(vec![RespValue::integer(1)])).is_error());
    }

    #[test]
    fn test_only_writes_are_logged() {
        let log = Arc::new(RecordingLog::default());
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_log(log.clone());

        dispatcher.dispatch(RespValue::command(["SET", "k", "v"]));
        dispatcher.dispatch(RespValue::command(["GET", "k"]));
        dispatcher.dispatch(RespValue::command(["hset", "h", "f", "v"]));
        dispatcher.dispatch(RespValue::command(["RPUSH", "L", "a"]));
        dispatcher.dispatch(RespValue::command(["SET", "only-key"]));
        dispatcher.close_log();

        let entries = log.entries.lock().unwrap();
        assert_eq!(*entries, vec![
            RespValue::command(["SET", "k", "v"]),
            RespValue::command(["hset", "h", "f", "v"]),
        ]);
        assert_eq!(*log.closed.lock().unwrap(), 1);
    }

    #[test]
    fn test_non_bulk_arguments_are_not_logged() {
        let log = Arc::new(RecordingLog::default());
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_log(log.clone());

        let request = RespValue::array(vec![
            RespValue::bulk_string("SET"),
            RespValue::integer(1),
            RespValue::bulk_string("v"),
        ]);
        assert_eq!(
            dispatcher.dispatch(request),
            RespValue::error("ERR invalid request: arguments must be bulk strings")
        );
        assert!(log.entries.lock().unwrap().is_empty());
        assert_eq!(dispatcher.context().engine.stats().strings, 0);
    }

    #[test]
    fn test_every_reply_is_a_single_frame() {
        let binary = Bytes::from_static(b"\xff\r\n+OK\r\n\x00");

        for style in [ReplyStyle::Legacy, ReplyStyle::Resp2] {
            let dispatcher = Dispatcher::with_context(CommandContext::new().with_reply_style(style));
            let requests = vec![
                RespValue::command(vec![Bytes::from("SET"), Bytes::from("k"), binary.clone()]),
                RespValue::command(["GET", "k"]),
                RespValue::command(vec![
                    Bytes::from("HSET"),
                    Bytes::from("h"),
                    Bytes::from("f"),
                    binary.clone(),
                ]),
                RespValue::command(["HGET", "h", "f"]),
                RespValue::command(vec![Bytes::from("RPUSH"), Bytes::from("L"), binary.clone()]),
                RespValue::command(["LPUSH", "L", "a\r\nb", "plain"]),
                RespValue::command(["LRANGE", "L", "0", "-1"]),
                RespValue::command(["LINDEX", "L", "-1"]),
                RespValue::command(["LLEN", "L"]),
                RespValue::command(["LSET", "L", "0", "x\ny"]),
                RespValue::command(["LPOP", "L"]),
                RespValue::command(["RPOP", "L"]),
                RespValue::command(["RPOP", "L"]),
                RespValue::command(["RPOP", "L"]),
                RespValue::command(["NO\r\nPE", "a\r\nb"]),
                RespValue::command(["RPOP", "no\r\nsuch"]),
                RespValue::command(["PING"]),
            ];

            for request in requests {
                let reply = dispatcher.dispatch(request.clone());
                let mut buf = BytesMut::from(&RespEncoder::encode(&reply)[..]);
                let mut parser = RespParser::new();

                let decoded = parser.parse(&mut buf).unwrap();
                assert!(decoded.is_some(), "{:?} -> {:?}", request, reply);
                assert!(buf.is_empty(), "{:?} -> {:?} left extra bytes", request, reply);
            }
        }
    }

    #[test]
    fn test_failed_append_is_not_applied() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_log(Arc::new(FailingLog));

        let result = dispatcher.dispatch(RespValue::command(["SET", "k", "v"]));
        assert!(result.is_error());
        assert_eq!(dispatcher.context().engine.get(b"k"), None);
    }

    #[test]
    fn test_with_aof_replays_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AofConfig {
            path: dir.path().join("replay.aof"),
            ..AofConfig::default()
        };

        {
            let dispatcher = Dispatcher::with_aof(CommandContext::new(), &config).unwrap();
            dispatcher.dispatch(RespValue::command(["SET", "k", "v1"]));
            dispatcher.dispatch(RespValue::command(["HSET", "h", "f", "x"]));
            dispatcher.dispatch(RespValue::command(["SET", "k", "v2"]));
            dispatcher.close_log();
        }

        let dispatcher = Dispatcher::with_aof(CommandContext::new(), &config).unwrap();
        assert_eq!(
            dispatcher.dispatch(RespValue::command(["GET", "k"])),
            RespValue::bulk_string("v2")
        );
        assert_eq!(
            dispatcher.dispatch(RespValue::command(["HGET", "h", "f"])),
            RespValue::bulk_string("x")
        );

        // Replay must not have appended the entries a second time
        let entries = AofReader::load(&config.path).unwrap().parse_entries();
        assert_eq!(entries.len(), 3);
    }
}

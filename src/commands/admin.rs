//! Admin commands (PING, COMMAND)

use super::{CommandContext, CommandResult};
use crate::protocol::RespValue;

/// PING command - Test connection
///
/// Syntax: PING [message]
///
/// Always replies PONG; any arguments are ignored.
pub(crate) fn ping(_ctx: &CommandContext, _args: &[RespValue]) -> CommandResult {
    Ok(RespValue::simple_string("PONG"))
}

/// COMMAND command - Capability introspection stub
///
/// Clients such as redis-cli send it on connect; a fixed OK is enough for
/// them to proceed.
pub(crate) fn command(_ctx: &CommandContext, _args: &[RespValue]) -> CommandResult {
    Ok(RespValue::bulk_string("OK"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_ignores_arguments() {
        let ctx = CommandContext::new();

        assert_eq!(ping(&ctx, &[]), Ok(RespValue::simple_string("PONG")));
        assert_eq!(
            ping(&ctx, &[RespValue::bulk_string("hello")]),
            Ok(RespValue::simple_string("PONG"))
        );
    }

    #[test]
    fn test_command_stub() {
        let ctx = CommandContext::new();
        let args = [RespValue::bulk_string("DOCS")];
        assert_eq!(command(&ctx, &args), Ok(RespValue::bulk_string("OK")));
    }
}

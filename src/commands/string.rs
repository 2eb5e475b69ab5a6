//! String commands (SET, GET)

use super::{bulk_arg, CommandContext, CommandResult};
use crate::protocol::RespValue;

/// SET command - Set a key to a value
///
/// Syntax: SET key value
pub(crate) fn set(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?.clone();
    let value = bulk_arg(args, 1)?.clone();

    ctx.engine.set(key, value);

    Ok(RespValue::simple_string("OK"))
}

/// GET command - Get the value of a key
///
/// Syntax: GET key
pub(crate) fn get(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?;

    Ok(match ctx.engine.get(key) {
        Some(value) => RespValue::bulk_string(value),
        None => RespValue::null(),
    })
}

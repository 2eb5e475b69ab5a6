//! List commands (LPUSH, RPUSH, LPOP, RPOP, LRANGE, LINDEX, LLEN, LSET)

use super::{bulk_arg, extract_bulk_string, integer_arg, CommandContext, CommandResult};
use crate::protocol::RespValue;
use crate::store::{ListSide, StoreError};

/// LPUSH command - Prepend one or multiple values to a list
///
/// Syntax: LPUSH key value [value ...]
///
/// Values are pushed one at a time in argument order, so `LPUSH k a b`
/// leaves `b` at the head.
pub(crate) fn lpush(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    push(ctx, args, ListSide::Left)
}

/// RPUSH command - Append one or multiple values to a list
///
/// Syntax: RPUSH key value [value ...]
pub(crate) fn rpush(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    push(ctx, args, ListSide::Right)
}

fn push(ctx: &CommandContext, args: &[RespValue], side: ListSide) -> CommandResult {
    let key = bulk_arg(args, 0)?.clone();

    // Validate every value before the list is created or touched
    let values = args[1..]
        .iter()
        .map(|arg| extract_bulk_string(arg).cloned())
        .collect::<Result<Vec<_>, _>>()?;

    let len = ctx.engine.push(key, side, values);

    Ok(ctx.count_reply(len))
}

/// LPOP command - Remove and return the first element of a list
///
/// Syntax: LPOP key
pub(crate) fn lpop(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    pop(ctx, args, ListSide::Left)
}

/// RPOP command - Remove and return the last element of a list
///
/// Syntax: RPOP key
pub(crate) fn rpop(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    pop(ctx, args, ListSide::Right)
}

fn pop(ctx: &CommandContext, args: &[RespValue], side: ListSide) -> CommandResult {
    let key = bulk_arg(args, 0)?;
    let value = ctx.engine.pop(key, side)?;

    Ok(ctx.element_reply(value))
}

/// LRANGE command - Get a range of elements from a list
///
/// Syntax: LRANGE key start stop
pub(crate) fn lrange(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?;
    let start = integer_arg(args, 1)?;
    let stop = integer_arg(args, 2)?;

    let elements = ctx
        .engine
        .list_range(key, start, stop)
        .into_iter()
        .map(|value| ctx.element_reply(value))
        .collect();

    Ok(RespValue::array(elements))
}

/// LINDEX command - Get an element from a list by its index
///
/// Syntax: LINDEX key index
pub(crate) fn lindex(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?;
    let index = integer_arg(args, 1)?;

    Ok(match ctx.engine.list_index(key, index) {
        Some(value) => ctx.element_reply(value),
        None => RespValue::null(),
    })
}

/// LLEN command - Get the length of a list
///
/// Syntax: LLEN key
pub(crate) fn llen(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?;

    Ok(ctx.count_reply(ctx.engine.list_len(key)))
}

/// LSET command - Set the value of an element in a list by its index
///
/// Syntax: LSET key index value
pub(crate) fn lset(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let key = bulk_arg(args, 0)?;
    let index = integer_arg(args, 1)?;
    let value = bulk_arg(args, 2)?.clone();

    match ctx.engine.list_set(key, index, value) {
        Ok(()) => Ok(RespValue::simple_string("OK")),
        Err(StoreError::NoSuchList(_)) => Ok(RespValue::null()),
        Err(e) => Err(e.into()),
    }
}

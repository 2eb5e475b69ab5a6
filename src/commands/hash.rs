//! Hash commands (HSET, HGET)

use super::{bulk_arg, CommandContext, CommandResult};
use crate::protocol::RespValue;

/// HSET command - Set field in the hash stored at key to value
///
/// Syntax: HSET key field value
///
/// Only the first field/value pair is applied; extra arguments are ignored.
pub(crate) fn hset(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let hash = bulk_arg(args, 0)?.clone();
    let field = bulk_arg(args, 1)?.clone();
    let value = bulk_arg(args, 2)?.clone();

    ctx.engine.hset(hash, field, value);

    Ok(RespValue::simple_string("OK"))
}

/// HGET command - Get the value of a hash field
///
/// Syntax: HGET key field
pub(crate) fn hget(ctx: &CommandContext, args: &[RespValue]) -> CommandResult {
    let hash = bulk_arg(args, 0)?;
    let field = bulk_arg(args, 1)?;

    Ok(match ctx.engine.hget(hash, field) {
        Some(value) => RespValue::bulk_string(value),
        None => RespValue::null(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&'static str]) -> Vec<RespValue> {
        parts.iter().map(|p| RespValue::bulk_string(*p)).collect()
    }

    #[test]
    fn test_hset_hget() {
        let ctx = CommandContext::new();

        assert_eq!(hset(&ctx, &args(&["h", "f", "x"])), Ok(RespValue::simple_string("OK")));
        assert_eq!(hget(&ctx, &args(&["h", "f"])), Ok(RespValue::bulk_string("x")));
        assert_eq!(hget(&ctx, &args(&["h", "g"])), Ok(RespValue::null()));
        assert_eq!(hget(&ctx, &args(&["missing-hash", "f"])), Ok(RespValue::null()));
    }

    #[test]
    fn test_hset_ignores_extra_pairs() {
        let ctx = CommandContext::new();

        hset(&ctx, &args(&["h", "f1", "v1", "f2", "v2"])).unwrap();

        assert_eq!(hget(&ctx, &args(&["h", "f1"])), Ok(RespValue::bulk_string("v1")));
        assert_eq!(hget(&ctx, &args(&["h", "f2"])), Ok(RespValue::null()));
    }
}

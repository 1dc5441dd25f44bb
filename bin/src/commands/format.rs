//! Format command implementation.

use anyhow::Result;
use presize_lib::prelude::*;

use crate::source::resolve_target;

/// Print the selection expression used for a target.
pub(crate) fn show_format(audio: bool, quality: Option<&str>) -> Result<()> {
    let target = resolve_target(audio, quality)?;
    println!("{}", SelectionExpr::for_target(target));
    Ok(())
}

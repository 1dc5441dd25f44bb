//! Check command implementation.
//!
//! Compares an estimate against the size a download actually turned out to
//! have, flagging rough estimates that were off by more than a factor of two.

use anyhow::Result;

use crate::display::format_bytes;
use crate::source::SourceArgs;
use presize_lib::prelude::*;

/// Estimate a locator and compare the result with `actual_bytes`.
pub(crate) async fn check(args: &SourceArgs, actual_bytes: u64, quiet: bool) -> Result<()> {
    let target = args.target()?;
    let estimate = args
        .inspect(target, quiet)
        .await
        .map_or_else(SizeEstimate::unknown, |(_, estimate)| estimate);

    println!("{}", estimate.label());
    println!(
        "Actual:     {} ({} bytes)",
        format_bytes(actual_bytes),
        actual_bytes
    );

    match estimate.discrepancy(actual_bytes) {
        Some(discrepancy) => {
            tracing::info!(ratio = discrepancy.ratio(), "size discrepancy");
            println!("{discrepancy}");
            println!("Ratio:      {:.2}x", discrepancy.ratio());
        }
        None => println!("No significant discrepancy."),
    }

    Ok(())
}

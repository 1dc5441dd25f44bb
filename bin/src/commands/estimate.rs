//! Estimate command implementation.
//!
//! This module fetches metadata for a locator and prints the size estimate,
//! either as a table or as a JSON document.

use anyhow::Result;

use crate::display::{EstimateReport, print_estimate};
use crate::source::SourceArgs;
use presize_lib::prelude::*;

/// Estimate and print the download size for a locator.
pub(crate) async fn estimate(args: &SourceArgs, json: bool, quiet: bool) -> Result<()> {
    let target = args.target()?;
    let inspected = args.inspect(target, quiet || json).await;
    let unknown = SizeEstimate::unknown();
    let (info, estimate) = match &inspected {
        Some((info, estimate)) => (Some(info), estimate),
        None => (None, &unknown),
    };

    if json {
        let report = EstimateReport::new(&args.locator, target, info, estimate);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_estimate(target, info, estimate);
    }

    Ok(())
}

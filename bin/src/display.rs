//! Display utilities and output formatting for the presize CLI.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use presize_lib::prelude::*;
use presize_lib::{ComponentEstimate, EstimateConfidence};
use serde::Serialize;

/// JSON document printed by `presize estimate --json`.
#[derive(Debug, Serialize)]
pub(crate) struct EstimateReport<'a> {
    pub(crate) locator: &'a str,
    pub(crate) target: Target,
    pub(crate) selection: String,
    pub(crate) id: Option<&'a str>,
    pub(crate) title: Option<&'a str>,
    pub(crate) duration_seconds: Option<f64>,
    pub(crate) total_bytes: u64,
    pub(crate) is_incomplete: bool,
    pub(crate) confidence: EstimateConfidence,
    pub(crate) label: String,
    pub(crate) components: &'a [ComponentEstimate],
}

impl<'a> EstimateReport<'a> {
    /// Builds a report; `info` is `None` if no metadata was obtained.
    pub(crate) fn new(
        locator: &'a str,
        target: Target,
        info: Option<&'a ResourceInfo>,
        estimate: &'a SizeEstimate,
    ) -> Self {
        Self {
            locator,
            target,
            selection: SelectionExpr::for_target(target).to_string(),
            id: info.and_then(|info| info.id.as_deref()),
            title: info.and_then(|info| info.title.as_deref()),
            duration_seconds: info.and_then(|info| info.duration_seconds),
            total_bytes: estimate.total_bytes,
            is_incomplete: estimate.is_incomplete,
            confidence: estimate.confidence(),
            label: estimate.label(),
            components: &estimate.components,
        }
    }
}

/// Creates the spinner shown while metadata is fetched.
pub(crate) fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints an estimate with its per-component breakdown.
pub(crate) fn print_estimate(target: Target, info: Option<&ResourceInfo>, estimate: &SizeEstimate) {
    if let Some(title) = info.and_then(|info| info.title.as_deref()) {
        println!("Title:      {title}");
    }
    if let Some(duration) = info.and_then(|info| info.duration_seconds) {
        println!("Duration:   {duration:.0}s");
    }
    println!("Target:     {target}");
    println!("Selection:  {}", SelectionExpr::for_target(target));
    println!();
    println!("{}", estimate.label());
    println!(
        "Total:      {} ({} bytes, {})",
        format_bytes(estimate.total_bytes),
        estimate.total_bytes,
        estimate.confidence()
    );

    if estimate.components.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<4} {:<12} {:<6} {:>12} {:<20}",
        "#", "FORMAT", "KIND", "SIZE", "SOURCE"
    );
    println!("{}", "-".repeat(58));
    for component in &estimate.components {
        println!(
            "{:<4} {:<12} {:<6} {:>12} {:<20}",
            component.index,
            component.format_id.as_deref().unwrap_or("-"),
            component.kind.as_str(),
            format_bytes(component.bytes),
            component.source.to_string(),
        );
    }
}

/// Formats bytes in human-readable form (e.g., "1.50 GB", "250.00 MB").
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presize_lib::SizeSource;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_572_864), "1.50 MB");
        assert_eq!(format_bytes(1_610_612_736), "1.50 GB");
    }

    #[test]
    fn test_report_json() {
        let info = ResourceInfo::new(Some(120.0));
        let estimate = SizeEstimate::from_components(vec![ComponentEstimate {
            index: 0,
            format_id: Some("251".to_string()),
            kind: presize_lib::MediaKind::Audio,
            bytes: 2_880_000,
            source: SizeSource::OwnBitrate,
        }]);
        let target = Target::Audio(AudioQuality::Medium);

        let report = EstimateReport::new("video.info.json", target, Some(&info), &estimate);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["selection"], "bestaudio/best");
        assert_eq!(value["total_bytes"], 2_880_000);
        assert_eq!(value["is_incomplete"], true);
        assert_eq!(value["confidence"], "rough");
        assert_eq!(value["components"][0]["source"], "own_bitrate");
        assert_eq!(value["components"][0]["format_id"], "251");
        assert!(value["title"].is_null());
    }

    #[test]
    fn test_report_without_metadata() {
        let estimate = SizeEstimate::unknown();
        let report = EstimateReport::new("x", Target::default(), None, &estimate);

        assert_eq!(report.label, "Size: Unknown (detailed info unavailable)");
        assert_eq!(report.duration_seconds, None);
        assert!(report.components.is_empty());
    }
}

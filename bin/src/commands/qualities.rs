//! Qualities command implementation.

use presize_lib::prelude::*;

/// List the audio and video quality tiers with their parameters.
pub(crate) fn list_qualities() {
    println!("{:<8} {:<10} {:<10}", "KIND", "LABEL", "PARAMETER");
    println!("{}", "-".repeat(30));

    for quality in AudioQuality::all() {
        let marker = if *quality == AudioQuality::default() { " (default)" } else { "" };
        println!(
            "{:<8} {:<10} {:<10}{marker}",
            "audio",
            quality.label(),
            quality.parameter()
        );
    }
    for quality in VideoQuality::all() {
        let marker = if *quality == VideoQuality::default() { " (default)" } else { "" };
        println!(
            "{:<8} {:<10} {:<10}{marker}",
            "video",
            quality.label(),
            quality.parameter()
        );
    }
}

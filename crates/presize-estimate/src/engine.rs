//! Size resolution for a normalized resource.

use std::sync::Arc;

use presize_types::{
    ComponentEstimate, EventSink, FormatDescriptor, MediaKind, ResourceInfo, SizeEstimate,
    SizeSource, TracingSink,
};

use crate::strategy::{ResolveContext, Strategy};

/// Turns a [`ResourceInfo`] into a [`SizeEstimate`].
///
/// The engine is stateless apart from its sink and never fails: anything it
/// cannot determine contributes zero bytes and marks the estimate incomplete.
#[derive(Debug, Clone)]
pub struct SizeEngine {
    sink: Arc<dyn EventSink>,
}

impl SizeEngine {
    /// Creates an engine reporting to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Returns the sink this engine reports to.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Estimates the download size of a resource.
    #[must_use]
    pub fn estimate(&self, info: &ResourceInfo) -> SizeEstimate {
        let requested = info.requested_formats.as_deref().unwrap_or_default();
        self.sink.record(
            "estimate_started",
            &[
                ("id", info.id.as_deref().into()),
                ("duration", info.duration_seconds.into()),
                ("formats", info.formats.len().into()),
                ("components", requested.len().into()),
            ],
        );

        let estimate = if info.is_split() {
            let components = requested
                .iter()
                .enumerate()
                .map(|(index, component)| match component {
                    Some(format) => self.resolve_component(info, index, format),
                    None => {
                        self.sink
                            .record("component_missing", &[("index", index.into())]);
                        ComponentEstimate::missing(index)
                    }
                })
                .collect();
            SizeEstimate::from_components(components)
        } else {
            self.estimate_top_level(info)
        };

        self.sink.record(
            "estimate_finished",
            &[
                ("total_bytes", estimate.total_bytes.into()),
                ("incomplete", estimate.is_incomplete.into()),
                ("confidence", estimate.confidence().as_str().into()),
            ],
        );
        estimate
    }

    /// Runs the strategy chain for one selected component.
    fn resolve_component(
        &self,
        info: &ResourceInfo,
        index: usize,
        format: &FormatDescriptor,
    ) -> ComponentEstimate {
        let kind = format.media_kind();
        let ctx = ResolveContext {
            duration_seconds: info.duration_seconds,
            catalog: &info.formats,
            component: format,
            sink: self.sink.as_ref(),
        };

        let (bytes, source) = Strategy::run_chain(Strategy::chain_for(kind), &ctx)
            .map_or((0, SizeSource::Unresolved), |resolved| {
                (resolved.bytes, resolved.source)
            });

        if kind == MediaKind::None {
            self.sink.record(
                "descriptor_unusable",
                &[
                    ("index", index.into()),
                    ("format_id", format.id.as_str().into()),
                    ("reason", "no audio or video codec".into()),
                ],
            );
        }
        self.sink.record(
            "component_resolved",
            &[
                ("index", index.into()),
                ("format_id", format.id.as_str().into()),
                ("kind", kind.as_str().into()),
                ("source", source.as_str().into()),
                ("proxy_id", source.proxy_id().into()),
                ("bytes", bytes.into()),
            ],
        );

        ComponentEstimate {
            index,
            format_id: Some(format.id.clone()),
            kind,
            bytes,
            source,
        }
    }

    /// Falls back to the size reported for the resource as a whole.
    fn estimate_top_level(&self, info: &ResourceInfo) -> SizeEstimate {
        let reported = [
            (SizeSource::Direct, info.direct_size_bytes),
            (SizeSource::Approx, info.approx_size_bytes),
        ]
        .into_iter()
        .find_map(|(source, bytes)| bytes.map(|b| (source, b)));

        match reported {
            Some((source, bytes)) => {
                self.sink.record(
                    "top_level_size",
                    &[("source", source.as_str().into()), ("bytes", bytes.into())],
                );
                SizeEstimate::exact(bytes)
            }
            None => {
                self.sink.record(
                    "undeterminable",
                    &[
                        ("id", info.id.as_deref().into()),
                        ("reason", "no selected components and no reported size".into()),
                    ],
                );
                SizeEstimate::unknown()
            }
        }
    }
}

impl Default for SizeEngine {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use presize_types::{EstimateConfidence, FieldValue, MemorySink, NullSink};

    fn engine_with_memory() -> (SizeEngine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (SizeEngine::new(sink.clone()), sink)
    }

    fn split(duration: f64, components: Vec<Option<FormatDescriptor>>) -> ResourceInfo {
        ResourceInfo::new(Some(duration)).with_requested(components)
    }

    #[test]
    fn test_all_direct_is_exact() {
        let info = split(
            60.0,
            vec![
                Some(FormatDescriptor::video("137", "avc1.640028", 1080).with_direct_size(50_000_000)),
                Some(FormatDescriptor::audio("140", "mp4a.40.2").with_direct_size(5_000_000)),
            ],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (55_000_000, false));
        assert_eq!(estimate.confidence(), EstimateConfidence::Exact);
        assert_eq!(estimate.components.len(), 2);
    }

    #[test]
    fn test_audio_bitrate() {
        let info = split(
            120.0,
            vec![Some(FormatDescriptor::audio("251", "opus").with_audio_bitrate(192.0))],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (2_880_000, true));
        assert_eq!(estimate.components[0].source, SizeSource::OwnBitrate);
        assert_relative_eq!(estimate.megabytes(), 2.746_582_031_25);
        assert_eq!(estimate.label(), "Rough est: ~2.75 MB (bitrate based)");
    }

    #[test]
    fn test_proxy_preferred_over_own_bitrate() {
        let proxy = FormatDescriptor::video("137", "avc1.640028", 1080).with_direct_size(30_000_000);
        let component = FormatDescriptor::video("248", "vp9", 1080).with_video_bitrate(5000.0);
        let info = split(100.0, vec![Some(component.clone())])
            .with_formats(vec![proxy, component]);

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (30_000_000, true));
        assert_eq!(
            estimate.components[0].source,
            SizeSource::ProxyDirect {
                proxy_id: "137".to_string()
            }
        );
    }

    #[test]
    fn test_proxy_ignores_itself() {
        let component = FormatDescriptor::video("137", "avc1.640028", 1080).with_video_bitrate(800.0);
        let info = split(10.0, vec![Some(component.clone())]).with_formats(vec![component]);

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.total_bytes, 1_000_000);
        assert_eq!(estimate.components[0].source, SizeSource::OwnBitrate);
    }

    #[test]
    fn test_missing_component() {
        let (engine, sink) = engine_with_memory();
        let info = split(
            60.0,
            vec![
                None,
                Some(FormatDescriptor::audio("140", "mp4a.40.2").with_direct_size(4_000_000)),
            ],
        );

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (4_000_000, true));
        assert_eq!(estimate.components[0], ComponentEstimate::missing(0));
        assert_eq!(
            sink.find("component_missing").and_then(|e| e.field("index").cloned()),
            Some(FieldValue::U64(0))
        );
    }

    #[test]
    fn test_approx_component_is_incomplete() {
        let info = split(
            60.0,
            vec![Some(FormatDescriptor::audio("140", "mp4a.40.2").with_approx_size(4_000_000))],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (4_000_000, true));
    }

    #[test]
    fn test_top_level_fallback() {
        let (engine, sink) = engine_with_memory();
        let info = ResourceInfo::new(Some(60.0)).with_approx_size(10_000_000);

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (10_000_000, false));
        assert!(estimate.components.is_empty());
        assert_eq!(sink.count("top_level_size"), 1);
    }

    #[test]
    fn test_top_level_prefers_direct() {
        let info = ResourceInfo::new(None)
            .with_direct_size(7)
            .with_approx_size(9);

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (7, false));
    }

    #[test]
    fn test_top_level_reported_zero_is_used() {
        let (engine, sink) = engine_with_memory();
        let info = ResourceInfo::new(Some(60.0))
            .with_direct_size(0)
            .with_approx_size(5);

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (0, false));
        let event = sink.find("top_level_size").unwrap();
        assert_eq!(
            event.field("source").map(ToString::to_string).as_deref(),
            Some("direct")
        );
    }

    #[test]
    fn test_empty_requested_uses_top_level() {
        let info = split(60.0, Vec::new()).with_direct_size(123);

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (123, false));
    }

    #[test]
    fn test_undeterminable() {
        let (engine, sink) = engine_with_memory();
        let info = ResourceInfo::new(Some(60.0));

        let estimate = engine.estimate(&info);

        assert_eq!(estimate, SizeEstimate::unknown());
        assert_eq!(estimate.label(), "Size: Unknown (detailed info unavailable)");
        assert_eq!(
            sink.names(),
            vec!["estimate_started", "undeterminable", "estimate_finished"]
        );
    }

    #[test]
    fn test_zero_duration_contributes_nothing() {
        let (engine, sink) = engine_with_memory();
        let info = split(
            0.0,
            vec![Some(FormatDescriptor::audio("251", "opus").with_audio_bitrate(160.0))],
        );

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (0, true));
        assert_eq!(estimate.components[0].source, SizeSource::Unresolved);
        assert_eq!(sink.count("bitrate_invalid"), 1);
    }

    #[test]
    fn test_negative_bitrate_contributes_nothing() {
        let info = split(
            60.0,
            vec![Some(FormatDescriptor::audio("251", "opus").with_audio_bitrate(-160.0))],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (0, true));
    }

    #[test]
    fn test_zero_video_bitrate_falls_back_to_overall() {
        let info = split(
            10.0,
            vec![Some(
                FormatDescriptor::video("248", "vp9", 1080)
                    .with_video_bitrate(0.0)
                    .with_overall_bitrate(800.0),
            )],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (1_000_000, true));
        assert_eq!(estimate.components[0].source, SizeSource::OwnBitrate);
    }

    #[test]
    fn test_unusable_component_is_logged() {
        let (engine, sink) = engine_with_memory();
        let mut storyboard = FormatDescriptor::new("sb0").with_direct_size(1_000);
        storyboard.overall_bitrate_kbps = Some(10.0);
        let info = split(60.0, vec![Some(storyboard)]);

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (0, true));
        assert_eq!(sink.count("descriptor_unusable"), 1);
        assert_eq!(sink.count("bitrate_derived"), 0);
    }

    #[test]
    fn test_sum_saturates() {
        let info = split(
            1.0,
            vec![
                Some(FormatDescriptor::audio("a", "opus").with_direct_size(u64::MAX)),
                Some(FormatDescriptor::audio("b", "opus").with_direct_size(10)),
            ],
        );

        let estimate = SizeEngine::new(Arc::new(NullSink)).estimate(&info);

        assert_eq!(estimate.as_pair(), (u64::MAX, false));
    }

    #[test]
    fn test_deterministic() {
        let proxy = FormatDescriptor::video("136", "avc1.4d401f", 720).with_video_bitrate(1200.0);
        let component = FormatDescriptor::video("247", "vp9", 720);
        let info = split(
            33.5,
            vec![
                Some(component.clone()),
                Some(FormatDescriptor::audio("251", "opus").with_audio_bitrate(129.5)),
            ],
        )
        .with_formats(vec![proxy, component]);
        let engine = SizeEngine::default();

        let first = engine.estimate(&info);
        let second = engine.estimate(&info);

        assert_eq!(first, second);
        // 33.5 * 150_000 + trunc(33.5 * 16_187.5)
        assert_eq!(first.total_bytes, 5_025_000 + 542_281);
    }

    #[test]
    fn test_event_sequence() {
        let (engine, sink) = engine_with_memory();
        let info = split(
            120.0,
            vec![Some(FormatDescriptor::audio("251", "opus").with_audio_bitrate(192.0))],
        );

        let estimate = engine.estimate(&info);

        assert_eq!(estimate.as_pair(), (2_880_000, true));
        assert_eq!(
            sink.names(),
            vec![
                "estimate_started",
                "bitrate_derived",
                "component_resolved",
                "estimate_finished"
            ]
        );
        let resolved = sink.find("component_resolved").unwrap();
        assert_eq!(
            resolved.field("source"),
            Some(&FieldValue::from("own_bitrate"))
        );
        assert_eq!(resolved.field("proxy_id"), Some(&FieldValue::Missing));
    }
}

//! Ordered size resolution strategies.
//!
//! A component's size comes from the first strategy in its chain that
//! yields a value. Video components may borrow the size of an H.264 stream
//! at the same height; candidates are tried in catalog order and the first
//! one with a positive figure wins, without ranking them further.

use presize_types::{EventSink, FormatDescriptor, MediaKind, SizeSource};

use crate::bitrate::bytes_from_bitrate;

/// A way of obtaining a component's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The component's exact size.
    Direct,
    /// The component's approximate size.
    Approx,
    /// The size of an H.264 stream at the same height.
    Proxy,
    /// Duration times the component's own bitrate.
    OwnBitrate,
}

/// A way of measuring a proxy stream, tried in [`PROXY_MEASURES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyMeasure {
    /// The proxy's exact size.
    Direct,
    /// The proxy's approximate size.
    Approx,
    /// Duration times the proxy's video bitrate.
    Bitrate,
}

/// Chain for components carrying video.
pub const VIDEO_CHAIN: &[Strategy] = &[
    Strategy::Direct,
    Strategy::Approx,
    Strategy::Proxy,
    Strategy::OwnBitrate,
];

/// Chain for audio-only components.
pub const AUDIO_CHAIN: &[Strategy] = &[Strategy::Direct, Strategy::Approx, Strategy::OwnBitrate];

/// Chain for components with neither codec, which never contribute.
pub const UNUSABLE_CHAIN: &[Strategy] = &[];

/// Order in which a proxy stream is measured.
pub const PROXY_MEASURES: &[ProxyMeasure] = &[
    ProxyMeasure::Direct,
    ProxyMeasure::Approx,
    ProxyMeasure::Bitrate,
];

/// A size together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Size in bytes.
    pub bytes: u64,
    /// Provenance.
    pub source: SizeSource,
}

/// Inputs shared by the strategies while resolving one component.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Resource duration in seconds.
    pub duration_seconds: Option<f64>,
    /// Full format catalog, in source order.
    pub catalog: &'a [FormatDescriptor],
    /// Component being resolved.
    pub component: &'a FormatDescriptor,
    /// Diagnostic sink.
    pub sink: &'a dyn EventSink,
}

impl Strategy {
    /// Returns the chain used for a component of the given kind.
    #[must_use]
    pub const fn chain_for(kind: MediaKind) -> &'static [Self] {
        match kind {
            MediaKind::Video => VIDEO_CHAIN,
            MediaKind::Audio => AUDIO_CHAIN,
            MediaKind::None => UNUSABLE_CHAIN,
        }
    }

    /// Attempts this strategy.
    #[must_use]
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<Resolved> {
        let component = ctx.component;
        match self {
            Self::Direct => component.direct_size_bytes.map(|bytes| Resolved {
                bytes,
                source: SizeSource::Direct,
            }),
            Self::Approx => component.approx_size_bytes.map(|bytes| Resolved {
                bytes,
                source: SizeSource::Approx,
            }),
            Self::Proxy => resolve_proxy(ctx),
            Self::OwnBitrate => {
                let bitrate = match component.media_kind() {
                    MediaKind::Video => component.video_bitrate_or_overall(),
                    MediaKind::Audio => component.audio_bitrate_kbps,
                    MediaKind::None => None,
                };
                derive(ctx, &component.id, bitrate).map(|bytes| Resolved {
                    bytes,
                    source: SizeSource::OwnBitrate,
                })
            }
        }
    }

    /// Evaluates a chain, first success wins.
    #[must_use]
    pub fn run_chain(chain: &[Self], ctx: &ResolveContext<'_>) -> Option<Resolved> {
        chain.iter().find_map(|strategy| strategy.resolve(ctx))
    }
}

impl ProxyMeasure {
    /// Measures a proxy stream. Only positive figures count.
    #[must_use]
    pub fn measure(&self, proxy: &FormatDescriptor, ctx: &ResolveContext<'_>) -> Option<Resolved> {
        let proxy_id = proxy.id.clone();
        let (bytes, source) = match self {
            Self::Direct => (proxy.direct_size_bytes?, SizeSource::ProxyDirect { proxy_id }),
            Self::Approx => (proxy.approx_size_bytes?, SizeSource::ProxyApprox { proxy_id }),
            Self::Bitrate => (
                derive(ctx, &proxy.id, proxy.video_bitrate_kbps)?,
                SizeSource::ProxyBitrate { proxy_id },
            ),
        };
        (bytes > 0).then_some(Resolved { bytes, source })
    }
}

/// Finds the first proxy in catalog order that yields a positive size.
fn resolve_proxy(ctx: &ResolveContext<'_>) -> Option<Resolved> {
    ctx.catalog
        .iter()
        .filter(|candidate| candidate.is_proxy_for(ctx.component))
        .find_map(|proxy| {
            ctx.sink.record(
                "proxy_candidate",
                &[
                    ("format_id", ctx.component.id.as_str().into()),
                    ("proxy_id", proxy.id.as_str().into()),
                    ("height", proxy.resolution_height.into()),
                    ("vbr", proxy.video_bitrate_kbps.into()),
                ],
            );
            PROXY_MEASURES
                .iter()
                .find_map(|measure| measure.measure(proxy, ctx))
        })
}

/// Derives a size from the bitrate, reporting the outcome. Zero results are
/// treated as unresolved.
fn derive(ctx: &ResolveContext<'_>, owner: &str, bitrate_kbps: Option<f64>) -> Option<u64> {
    match bytes_from_bitrate(ctx.duration_seconds, bitrate_kbps) {
        Ok(bytes) if bytes > 0 => {
            ctx.sink.record(
                "bitrate_derived",
                &[
                    ("format_id", owner.into()),
                    ("duration", ctx.duration_seconds.into()),
                    ("kbps", bitrate_kbps.into()),
                    ("bytes", bytes.into()),
                ],
            );
            Some(bytes)
        }
        Ok(_) => {
            ctx.sink.record(
                "bitrate_invalid",
                &[("format_id", owner.into()), ("reason", "zero size".into())],
            );
            None
        }
        Err(err) => {
            ctx.sink.record(
                "bitrate_invalid",
                &[("format_id", owner.into()), ("reason", err.to_string().into())],
            );
            None
        }
    }
}

//! Normalization of extractor metadata into [`ResourceInfo`].

use std::sync::Arc;

use presize_types::{EventSink, FormatDescriptor, MediaKind, ResourceInfo, TracingSink};
use serde_json::{Map, Value};

use crate::{CatalogError, Selection, SelectionExpr};

/// Converts raw extractor payloads into [`ResourceInfo`].
///
/// Absent and `null` fields become `None`. Fields that are present but
/// unusable (non-numeric strings, negative sizes, non-finite numbers) are
/// reported to the sink as `invalid_numeric` and also become `None`.
#[derive(Debug, Clone)]
pub struct CatalogNormalizer {
    sink: Arc<dyn EventSink>,
}

impl CatalogNormalizer {
    /// Creates a normalizer reporting to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Normalizes a payload fetched with the given selection expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object or the expression
    /// cannot be parsed.
    pub fn normalize(&self, raw: &Value, expression: &str) -> Result<ResourceInfo, CatalogError> {
        let expression: SelectionExpr = expression.parse()?;
        self.normalize_with(raw, &expression)
    }

    /// Normalizes a payload with an already parsed selection expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object.
    pub fn normalize_with(
        &self,
        raw: &Value,
        expression: &SelectionExpr,
    ) -> Result<ResourceInfo, CatalogError> {
        let object = raw.as_object().ok_or(CatalogError::NotAnObject)?;
        let reader = FieldReader {
            object,
            owner: "resource",
            sink: self.sink.as_ref(),
        };

        let formats = match object.get("formats") {
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| self.descriptor(entry, index))
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                self.sink.record(
                    "invalid_field",
                    &[("field", "formats".into()), ("value", other.to_string().into())],
                );
                Vec::new()
            }
        };

        let mut info = ResourceInfo {
            id: reader.string("id"),
            title: reader.string("title"),
            duration_seconds: reader.number("duration"),
            formats,
            requested_formats: None,
            direct_size_bytes: reader.size("filesize"),
            approx_size_bytes: reader.size("filesize_approx"),
        };

        match object.get("requested_formats") {
            Some(Value::Array(entries)) => {
                info.requested_formats = Some(
                    entries
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| self.descriptor(entry, index))
                        .collect(),
                );
            }
            _ if object.contains_key("format_id") || info.formats.is_empty() => {}
            _ => self.apply_selection(&mut info, expression),
        }

        self.sink.record(
            "catalog_normalized",
            &[
                ("formats", info.formats.len().into()),
                (
                    "requested",
                    info.requested_formats.as_ref().map(Vec::len).into(),
                ),
                ("duration", info.duration_seconds.into()),
            ],
        );
        Ok(info)
    }

    /// Evaluates the expression locally for payloads that list formats but
    /// were not resolved by the extractor.
    fn apply_selection(&self, info: &mut ResourceInfo, expression: &SelectionExpr) {
        match expression.select(&info.formats) {
            Some(Selection::Merged(first, second)) => {
                self.sink.record(
                    "selection_applied",
                    &[
                        ("expression", expression.to_string().into()),
                        ("format_id", format!("{}+{}", first.id, second.id).into()),
                    ],
                );
                info.requested_formats = Some(vec![Some(first.clone()), Some(second.clone())]);
            }
            Some(Selection::Single(format)) => {
                self.sink.record(
                    "selection_applied",
                    &[
                        ("expression", expression.to_string().into()),
                        ("format_id", format.id.as_str().into()),
                    ],
                );
                info.direct_size_bytes = format.direct_size_bytes;
                info.approx_size_bytes = format.approx_size_bytes;
            }
            None => self.sink.record(
                "selection_unmatched",
                &[("expression", expression.to_string().into())],
            ),
        }
    }

    /// Normalizes one format entry. `null` entries yield `None`.
    fn descriptor(&self, raw: &Value, index: usize) -> Option<FormatDescriptor> {
        let object = match raw {
            Value::Object(object) => object,
            Value::Null => return None,
            other => {
                self.sink.record(
                    "descriptor_unusable",
                    &[("index", index.into()), ("value", other.to_string().into())],
                );
                return None;
            }
        };

        let id = match object.get("format_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => format!("#{index}"),
        };
        let reader = FieldReader {
            object,
            owner: &id,
            sink: self.sink.as_ref(),
        };

        let descriptor = FormatDescriptor {
            video_codec: reader.codec("vcodec"),
            audio_codec: reader.codec("acodec"),
            resolution_height: reader.height("height"),
            video_bitrate_kbps: reader.number("vbr"),
            overall_bitrate_kbps: reader.number("tbr"),
            audio_bitrate_kbps: reader.number("abr"),
            direct_size_bytes: reader.size("filesize"),
            approx_size_bytes: reader.size("filesize_approx"),
            id: id.clone(),
        };

        if descriptor.media_kind() == MediaKind::None {
            self.sink.record(
                "descriptor_unusable",
                &[("index", index.into()), ("format_id", id.as_str().into())],
            );
        }
        Some(descriptor)
    }
}

impl Default for CatalogNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

/// Reads typed fields from one JSON object, reporting unusable values.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    owner: &'a str,
    sink: &'a dyn EventSink,
}

impl FieldReader<'_> {
    fn string(&self, key: &str) -> Option<String> {
        match self.object.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Reads a codec tag; the literal `"none"` means the stream is absent.
    fn codec(&self, key: &str) -> Option<String> {
        self.string(key)
            .map(|codec| codec.trim().to_string())
            .filter(|codec| !codec.is_empty() && !codec.eq_ignore_ascii_case("none"))
    }

    /// Reads a non-negative finite number, accepting numeric strings.
    fn number(&self, key: &str) -> Option<f64> {
        let value = self.object.get(key)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                self.invalid(key, value);
                None
            }
        }
    }

    fn size(&self, key: &str) -> Option<u64> {
        self.number(key).map(|n| n as u64)
    }

    fn height(&self, key: &str) -> Option<u32> {
        let height = self.number(key)?;
        if height >= 1.0 && height <= f64::from(u32::MAX) {
            Some(height as u32)
        } else {
            self.invalid(key, &self.object[key]);
            None
        }
    }

    fn invalid(&self, key: &str, value: &Value) {
        self.sink.record(
            "invalid_numeric",
            &[
                ("owner", self.owner.into()),
                ("field", key.into()),
                ("value", value.to_string().into()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presize_types::{FieldValue, MemorySink};
    use serde_json::json;

    const VIDEO_720: &str = "bestvideo[height<=720]+bestaudio/best[height<=720]/best";

    fn normalizer() -> (CatalogNormalizer, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (CatalogNormalizer::new(sink.clone()), sink)
    }

    #[test]
    fn test_requested_formats_from_payload() {
        let (normalizer, _) = normalizer();
        let raw = json!({
            "id": "abc",
            "title": "Clip",
            "duration": 120,
            "format_id": "136+140",
            "formats": [
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5, "filesize": 1_940_000},
                {"format_id": "136", "vcodec": "avc1.4d401f", "acodec": "none", "height": 720, "vbr": 1200, "filesize_approx": 18_000_000}
            ],
            "requested_formats": [
                {"format_id": "136", "vcodec": "avc1.4d401f", "acodec": "none", "height": 720, "vbr": 1200, "filesize_approx": 18_000_000},
                null
            ]
        });

        let info = normalizer.normalize(&raw, VIDEO_720).unwrap();

        assert_eq!(info.id.as_deref(), Some("abc"));
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert_eq!(info.duration_seconds, Some(120.0));
        assert_eq!(info.formats.len(), 2);

        let requested = info.requested_formats.unwrap();
        assert_eq!(requested.len(), 2);
        let video = requested[0].as_ref().unwrap();
        assert_eq!(video.id, "136");
        assert_eq!(video.media_kind(), MediaKind::Video);
        assert!(video.is_video_only());
        assert_eq!(video.resolution_height, Some(720));
        assert_eq!(video.video_bitrate_kbps, Some(1200.0));
        assert_eq!(video.direct_size_bytes, None);
        assert_eq!(video.approx_size_bytes, Some(18_000_000));
        assert!(requested[1].is_none());
    }

    #[test]
    fn test_missing_fields_are_none() {
        let (normalizer, sink) = normalizer();
        let raw = json!({
            "format_id": "18",
            "formats": [{"format_id": "18", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": null}]
        });

        let info = normalizer.normalize(&raw, "best").unwrap();
        let format = &info.formats[0];

        assert_eq!(info.duration_seconds, None);
        assert_eq!(format.resolution_height, None);
        assert_eq!(format.video_bitrate_kbps, None);
        assert_eq!(format.direct_size_bytes, None);
        assert_eq!(info.requested_formats, None);
        assert_eq!(sink.count("invalid_numeric"), 0);
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let (normalizer, sink) = normalizer();
        let raw = json!({
            "format_id": "251",
            "duration": "95.5",
            "formats": [{
                "format_id": "251",
                "acodec": "opus",
                "abr": "fast",
                "tbr": -3,
                "filesize": "2048"
            }]
        });

        let info = normalizer.normalize(&raw, "bestaudio/best").unwrap();
        let format = &info.formats[0];

        assert_eq!(info.duration_seconds, Some(95.5));
        assert_eq!(format.audio_bitrate_kbps, None);
        assert_eq!(format.overall_bitrate_kbps, None);
        assert_eq!(format.direct_size_bytes, Some(2048));
        assert_eq!(sink.count("invalid_numeric"), 2);

        let event = sink.find("invalid_numeric").unwrap();
        assert_eq!(event.field("owner"), Some(&FieldValue::from("251")));
        assert_eq!(event.field("field"), Some(&FieldValue::from("tbr")));
    }

    #[test]
    fn test_unusable_descriptor_is_kept_and_logged() {
        let (normalizer, sink) = normalizer();
        let raw = json!({
            "format_id": "sb0",
            "formats": [{"format_id": "sb0", "vcodec": "none", "acodec": "none"}, "junk"]
        });

        let info = normalizer.normalize(&raw, "best").unwrap();

        assert_eq!(info.formats.len(), 1);
        assert_eq!(info.formats[0].media_kind(), MediaKind::None);
        assert_eq!(sink.count("descriptor_unusable"), 2);
    }

    #[test]
    fn test_resolved_single_format_uses_top_level_size() {
        let (normalizer, _) = normalizer();
        let raw = json!({
            "format_id": "22",
            "filesize_approx": 10_000_000,
            "formats": [{"format_id": "22", "vcodec": "avc1.64001F", "acodec": "mp4a.40.2", "height": 720}]
        });

        let info = normalizer.normalize(&raw, VIDEO_720).unwrap();

        assert_eq!(info.requested_formats, None);
        assert_eq!(info.direct_size_bytes, None);
        assert_eq!(info.approx_size_bytes, Some(10_000_000));
    }

    #[test]
    fn test_unresolved_catalog_applies_split_selection() {
        let (normalizer, sink) = normalizer();
        let raw = json!({
            "duration": 60.0,
            "formats": [
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.0},
                {"format_id": "136", "vcodec": "avc1.4d401f", "acodec": "none", "height": 720, "vbr": 1200.0},
                {"format_id": "137", "vcodec": "avc1.640028", "acodec": "none", "height": 1080, "vbr": 2500.0}
            ]
        });

        let info = normalizer.normalize(&raw, VIDEO_720).unwrap();
        let ids: Vec<_> = info
            .requested_formats
            .unwrap()
            .into_iter()
            .map(|f| f.unwrap().id)
            .collect();

        assert_eq!(ids, vec!["136", "140"]);
        assert_eq!(sink.count("selection_applied"), 1);
    }

    #[test]
    fn test_unresolved_catalog_applies_single_selection() {
        let (normalizer, _) = normalizer();
        let raw = json!({
            "formats": [
                {"format_id": "18", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360, "filesize": 7_000_000}
            ]
        });

        let info = normalizer.normalize(&raw, VIDEO_720).unwrap();

        assert_eq!(info.requested_formats, None);
        assert_eq!(info.direct_size_bytes, Some(7_000_000));
    }

    #[test]
    fn test_unmatched_selection_is_logged() {
        let (normalizer, sink) = normalizer();
        let raw = json!({
            "formats": [{"format_id": "sb0", "vcodec": "none", "acodec": "none"}]
        });

        let info = normalizer.normalize(&raw, "bestaudio").unwrap();

        assert_eq!(info.requested_formats, None);
        assert_eq!(sink.count("selection_unmatched"), 1);
    }

    #[test]
    fn test_malformed_catalog_is_reported() {
        let (normalizer, sink) = normalizer();
        let raw = json!({"duration": 30, "formats": "137,140", "filesize": 10});

        let info = normalizer.normalize(&raw, "best").unwrap();

        assert!(info.formats.is_empty());
        assert_eq!(info.direct_size_bytes, Some(10));
        let event = sink.find("invalid_field").unwrap();
        assert_eq!(
            event.field("field").map(ToString::to_string).as_deref(),
            Some("formats")
        );
        assert_eq!(sink.names().last().map(String::as_str), Some("catalog_normalized"));
    }

    #[test]
    fn test_errors() {
        let (normalizer, _) = normalizer();
        assert_eq!(
            normalizer.normalize(&json!([1, 2]), "best"),
            Err(CatalogError::NotAnObject)
        );
        assert!(matches!(
            normalizer.normalize(&json!({}), "worst"),
            Err(CatalogError::Selection(_))
        ));
    }

    #[test]
    fn test_numeric_format_id_and_fallback_id() {
        let (normalizer, _) = normalizer();
        let raw = json!({
            "format_id": "1",
            "formats": [{"format_id": 1, "acodec": "aac"}, {"acodec": "aac"}]
        });

        let info = normalizer.normalize(&raw, "best").unwrap();

        assert_eq!(info.formats[0].id, "1");
        assert_eq!(info.formats[1].id, "#1");
    }
}

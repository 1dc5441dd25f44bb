//! Format selection expressions.
//!
//! Supports the subset of the downloader's selection grammar needed to pick
//! streams for a [`Target`]:
//!
//! ```text
//! expr        := alternative ('/' alternative)*
//! alternative := selector ('+' selector)?
//! selector    := ('best' | 'bestvideo' | 'bestaudio') filter*
//! filter      := '[' 'height' ('<=' | '<' | '>=' | '>' | '=') integer ']'
//! ```
//!
//! Alternatives are tried left to right and the first one whose selectors
//! all match wins. Within a selector, candidates are ranked by height and
//! then bitrate; ties go to the later catalog entry, since extractors list
//! formats from worst to best.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use presize_types::{FormatDescriptor, MediaKind, Target};

use crate::SelectionParseError;

/// Which family of formats a selector draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatClass {
    /// Formats carrying both video and audio.
    Best,
    /// Video-only formats.
    BestVideo,
    /// Audio-only formats.
    BestAudio,
}

impl FormatClass {
    /// Returns the selector keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::BestVideo => "bestvideo",
            Self::BestAudio => "bestaudio",
        }
    }

    /// Returns true if the format belongs to this class.
    #[must_use]
    pub const fn admits(&self, format: &FormatDescriptor) -> bool {
        match self {
            Self::Best => format.is_muxed(),
            Self::BestVideo => format.is_video_only(),
            Self::BestAudio => format.is_audio_only(),
        }
    }
}

impl FromStr for FormatClass {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" | "b" => Ok(Self::Best),
            "bestvideo" | "bv" => Ok(Self::BestVideo),
            "bestaudio" | "ba" => Ok(Self::BestAudio),
            _ => Err(SelectionParseError::UnknownSelector(s.to_string())),
        }
    }
}

/// Comparison operator in a height filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `<=`
    AtMost,
    /// `<`
    Below,
    /// `>=`
    AtLeast,
    /// `>`
    Above,
    /// `=`
    Exactly,
}

impl Comparison {
    /// Returns the operator symbol.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AtMost => "<=",
            Self::Below => "<",
            Self::AtLeast => ">=",
            Self::Above => ">",
            Self::Exactly => "=",
        }
    }

    /// Evaluates `lhs <op> rhs`.
    #[must_use]
    pub const fn holds(&self, lhs: u32, rhs: u32) -> bool {
        match self {
            Self::AtMost => lhs <= rhs,
            Self::Below => lhs < rhs,
            Self::AtLeast => lhs >= rhs,
            Self::Above => lhs > rhs,
            Self::Exactly => lhs == rhs,
        }
    }
}

/// A `[height<op>value]` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeightFilter {
    /// Comparison operator.
    pub comparison: Comparison,
    /// Height in pixels.
    pub value: u32,
}

impl HeightFilter {
    /// Creates a `[height<=max]` filter.
    #[must_use]
    pub const fn at_most(max: u32) -> Self {
        Self {
            comparison: Comparison::AtMost,
            value: max,
        }
    }

    /// Returns true if the format passes the filter. Formats without a
    /// known height never pass.
    #[must_use]
    pub fn matches(&self, format: &FormatDescriptor) -> bool {
        format
            .resolution_height
            .is_some_and(|height| self.comparison.holds(height, self.value))
    }
}

impl fmt::Display for HeightFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[height{}{}]", self.comparison.as_str(), self.value)
    }
}

impl FromStr for HeightFilter {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SelectionParseError::InvalidFilter(s.to_string());
        let op_start = s
            .find(|c: char| matches!(c, '<' | '>' | '='))
            .ok_or_else(invalid)?;
        let field = s[..op_start].trim();
        if field != "height" {
            return Err(SelectionParseError::UnsupportedField(field.to_string()));
        }

        let rest = &s[op_start..];
        let (comparison, value) = [
            ("<=", Comparison::AtMost),
            (">=", Comparison::AtLeast),
            ("<", Comparison::Below),
            (">", Comparison::Above),
            ("=", Comparison::Exactly),
        ]
        .into_iter()
        .find_map(|(symbol, comparison)| {
            rest.strip_prefix(symbol).map(|value| (comparison, value))
        })
        .ok_or_else(invalid)?;

        let value = value.trim().parse().map_err(|_| invalid())?;
        Ok(Self { comparison, value })
    }
}

/// A single selector such as `bestvideo[height<=720]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Format family.
    pub class: FormatClass,
    /// Filters every candidate must pass.
    pub filters: Vec<HeightFilter>,
}

impl Selector {
    /// Creates a selector without filters.
    #[must_use]
    pub const fn new(class: FormatClass) -> Self {
        Self {
            class,
            filters: Vec::new(),
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: HeightFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Picks the best matching format from the catalog.
    ///
    /// `best` falls back to any usable format when the catalog has no muxed
    /// format, as happens for audio-only sources.
    #[must_use]
    pub fn pick<'a>(&self, formats: &'a [FormatDescriptor]) -> Option<&'a FormatDescriptor> {
        let passes = |format: &&FormatDescriptor| {
            self.filters.iter().all(|filter| filter.matches(format))
        };
        let ranked = |candidates: Vec<&'a FormatDescriptor>| {
            candidates.into_iter().max_by(|a, b| compare_rank(a, b))
        };

        let admitted: Vec<_> = formats
            .iter()
            .filter(|format| self.class.admits(format))
            .filter(passes)
            .collect();
        if !admitted.is_empty() || self.class != FormatClass::Best {
            return ranked(admitted);
        }

        ranked(
            formats
                .iter()
                .filter(|format| format.media_kind() != MediaKind::None)
                .filter(passes)
                .collect(),
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class.as_str())?;
        for filter in &self.filters {
            write!(f, "{filter}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, mut rest) = s.find('[').map_or((s, ""), |idx| s.split_at(idx));
        let mut selector = Self::new(name.trim().parse()?);

        while !rest.is_empty() {
            let body = rest
                .strip_prefix('[')
                .ok_or_else(|| SelectionParseError::InvalidFilter(rest.to_string()))?;
            let end = body
                .find(']')
                .ok_or_else(|| SelectionParseError::InvalidFilter(rest.to_string()))?;
            selector.filters.push(body[..end].parse()?);
            rest = body[end + 1..].trim_start();
        }

        Ok(selector)
    }
}

/// One `/`-separated alternative: a single selector or a merge of two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alternative {
    /// First (or only) selector.
    pub primary: Selector,
    /// Selector merged with the primary, if any.
    pub merge: Option<Selector>,
}

impl Alternative {
    /// Creates a single-selector alternative.
    #[must_use]
    pub const fn single(selector: Selector) -> Self {
        Self {
            primary: selector,
            merge: None,
        }
    }

    /// Creates a merged alternative.
    #[must_use]
    pub const fn merged(primary: Selector, merge: Selector) -> Self {
        Self {
            primary,
            merge: Some(merge),
        }
    }

    /// Evaluates the alternative. Returns `None` unless every selector
    /// matches.
    #[must_use]
    pub fn select<'a>(&self, formats: &'a [FormatDescriptor]) -> Option<Selection<'a>> {
        let primary = self.primary.pick(formats)?;
        match &self.merge {
            Some(merge) => {
                let second = merge.pick(formats)?;
                Some(Selection::Merged(primary, second))
            }
            None => Some(Selection::Single(primary)),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)?;
        if let Some(merge) = &self.merge {
            write!(f, "+{merge}")?;
        }
        Ok(())
    }
}

impl FromStr for Alternative {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SelectionParseError::Empty(s.to_string()));
        }
        let parts: Vec<&str> = s.split('+').collect();
        match parts.as_slice() {
            [single] => Ok(Self::single(single.parse()?)),
            [primary, merge] => Ok(Self::merged(primary.parse()?, merge.parse()?)),
            _ => Err(SelectionParseError::TooManyComponents(s.to_string())),
        }
    }
}

/// Formats chosen by a selection expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// One format carrying everything.
    Single(&'a FormatDescriptor),
    /// Two formats to be merged, in expression order.
    Merged(&'a FormatDescriptor, &'a FormatDescriptor),
}

impl<'a> Selection<'a> {
    /// Returns the chosen formats in order.
    #[must_use]
    pub fn formats(&self) -> Vec<&'a FormatDescriptor> {
        match *self {
            Self::Single(format) => vec![format],
            Self::Merged(first, second) => vec![first, second],
        }
    }
}

/// A parsed format selection expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionExpr {
    alternatives: Vec<Alternative>,
}

impl SelectionExpr {
    /// Creates an expression from its alternatives.
    #[must_use]
    pub const fn new(alternatives: Vec<Alternative>) -> Self {
        Self { alternatives }
    }

    /// Builds the expression the downloader uses for a target.
    ///
    /// Audio targets always take the best audio stream; the tier only sets
    /// the re-encode bitrate of the output. Video targets take the best
    /// video-only stream under the ceiling plus the best audio, then a muxed
    /// stream under the ceiling, then anything.
    #[must_use]
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Audio(_) => Self::new(vec![
                Alternative::single(Selector::new(FormatClass::BestAudio)),
                Alternative::single(Selector::new(FormatClass::Best)),
            ]),
            Target::Video(quality) => {
                let ceiling = HeightFilter::at_most(quality.max_height());
                Self::new(vec![
                    Alternative::merged(
                        Selector::new(FormatClass::BestVideo).with_filter(ceiling),
                        Selector::new(FormatClass::BestAudio),
                    ),
                    Alternative::single(Selector::new(FormatClass::Best).with_filter(ceiling)),
                    Alternative::single(Selector::new(FormatClass::Best)),
                ])
            }
        }
    }

    /// Returns the alternatives in evaluation order.
    #[must_use]
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Evaluates the expression over a catalog.
    #[must_use]
    pub fn select<'a>(&self, formats: &'a [FormatDescriptor]) -> Option<Selection<'a>> {
        self.alternatives
            .iter()
            .find_map(|alternative| alternative.select(formats))
    }
}

impl fmt::Display for SelectionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alternative) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{alternative}")?;
        }
        Ok(())
    }
}

impl FromStr for SelectionExpr {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SelectionParseError::Empty(s.to_string()));
        }
        let alternatives = s
            .split('/')
            .map(str::parse)
            .collect::<Result<Vec<Alternative>, _>>()?;
        Ok(Self::new(alternatives))
    }
}

/// Orders formats by height, then bitrate.
fn compare_rank(a: &FormatDescriptor, b: &FormatDescriptor) -> Ordering {
    a.resolution_height
        .unwrap_or(0)
        .cmp(&b.resolution_height.unwrap_or(0))
        .then_with(|| a.ranking_bitrate().total_cmp(&b.ranking_bitrate()))
}

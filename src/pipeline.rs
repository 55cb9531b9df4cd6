use crate::background;
use crate::config::OverlayConfig;
use crate::metrics::{self, CanvasMetrics};
use crate::overlay::{self, Edited};
use crate::palette;
use crate::parser::{parse_svg, ParseError};
use crate::prune::{self, PruneOutcome};

/// Backdrop sentinel reported when the selector is bypassed.
pub const TRANSPARENT: &str = "transparent";

/// One discrete edit from the caller: new source text, a dimension field, or
/// a configuration toggle. The caller serializes edits; each pass recomputes
/// everything.
#[derive(Debug, Clone)]
pub struct AnnotateRequest<'a> {
    pub source: &'a str,
    /// Free-form numeric text from the width input field.
    pub requested_width: Option<&'a str>,
    pub requested_height: Option<&'a str>,
    pub edited: Edited,
    /// Width/height ratio from the previous successful pass.
    pub prior_ratio: Option<f64>,
    pub prune: bool,
    pub config: OverlayConfig,
}

impl<'a> AnnotateRequest<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            requested_width: None,
            requested_height: None,
            edited: Edited::None,
            prior_ratio: None,
            prune: true,
            config: OverlayConfig::default(),
        }
    }
}

/// The complete output of one annotation pass. Nothing here persists;
/// callers retain `width`/`height`/`ratio` themselves for the aspect lock,
/// updating them atomically after each successful pass.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Sanitized, pruned markup with corrected sizing attributes.
    pub document: String,
    /// Overlay fragment in the same coordinate space as the document.
    pub overlay: String,
    /// Resolved backdrop: `transparent` or a hex value.
    pub background: String,
    pub metrics: CanvasMetrics,
    pub width: f64,
    pub height: f64,
    pub ratio: f64,
    pub margin: f64,
    /// Informational, not errors: an empty palette or zero pruned shapes
    /// just means nothing needed changing.
    pub palette_size: usize,
    pub pruned: PruneOutcome,
}

/// Run the full pipeline once: ingest → metrics → prune → palette →
/// background → overlay → serialize.
///
/// Pruning runs before palette extraction so a removed background
/// rectangle's color does not skew backdrop scoring. On failure there is no
/// partial output; callers clear any stale previous result.
pub fn annotate(request: &AnnotateRequest<'_>) -> Result<Annotation, ParseError> {
    let mut doc = parse_svg(request.source)?;
    let canvas = metrics::resolve(&mut doc);

    let pruned = if request.prune {
        prune::prune_background(&mut doc, &canvas)
    } else {
        PruneOutcome::NotAttempted
    };

    let palette = palette::extract(&doc);
    let background = if request.config.transparent_background {
        TRANSPARENT.to_string()
    } else {
        background::select(&palette).to_hex()
    };

    let (width, height) = overlay::resolve_dimensions(
        &canvas,
        request.requested_width.and_then(parse_dimension_field),
        request.requested_height.and_then(parse_dimension_field),
        request.edited,
        request.prior_ratio,
        request.config.lock_aspect_ratio,
    );
    let geometry = overlay::generate(&canvas, width, height, &request.config);
    let fragment = overlay::to_svg_fragment(&geometry, &request.config);

    doc.root.set_attr("width", &format!("{}", width));
    doc.root.set_attr("height", &format!("{}", height));

    Ok(Annotation {
        document: doc.to_svg_string(),
        overlay: fragment,
        background,
        metrics: canvas,
        width,
        height,
        ratio: width / height,
        margin: geometry.margin,
        palette_size: palette.len(),
        pruned,
    })
}

/// Parse a dimension input field: free-form numeric text with an optional
/// decimal part. Anything non-positive or non-finite is ignored.
pub fn parse_dimension_field(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

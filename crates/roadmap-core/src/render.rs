//! SVG connector overlay
//!
//! Renders the axis, one marker per measured card and one connector per
//! card. Done cards switch to the green palette; the active card gets a
//! larger marker, a thicker stroke and the glow filter.

use crate::view::RoadmapView;
use roadmap_layout::{GeometrySnapshot, SequenceLink};
use std::fmt::{self, Display, Formatter};

const AXIS_STROKE: &str = "rgba(255,255,255,0.12)";
const MARKER_FILL: &str = "rgba(245,233,188,0.65)";
const MARKER_FILL_DONE: &str = "rgba(140,255,210,0.7)";
const CONNECTOR_STROKE: &str = "url(#lineGrad)";
const CONNECTOR_STROKE_DONE: &str = "rgba(140,255,210,0.50)";
const GRADIENT_FROM: &str = "rgba(245,233,188,0.55)";
const GRADIENT_TO: &str = "rgba(210,224,255,0.40)";
const LINK_STROKE: &str = "rgba(210,224,255,0.18)";
const CARD_FILL: &str = "rgba(255,255,255,0.04)";
const CARD_STROKE: &str = "rgba(255,255,255,0.16)";
const CARD_STROKE_DONE: &str = "rgba(140,255,210,0.45)";

/// SVG document for one frame
///
/// Rendered through [`Display`].
#[derive(Debug, Clone, Copy)]
pub struct SvgOverlay<'a> {
    view: &'a RoadmapView,
    snapshot: &'a GeometrySnapshot,
    links: &'a [SequenceLink],
    cards: bool,
}

impl<'a> SvgOverlay<'a> {
    /// Overlay of `view` sized to `snapshot`'s container
    #[must_use]
    pub fn new(view: &'a RoadmapView, snapshot: &'a GeometrySnapshot) -> Self {
        Self {
            view,
            snapshot,
            links: &[],
            cards: false,
        }
    }

    /// Also draw card-to-card links
    #[must_use]
    pub fn with_sequence_links(mut self, links: &'a [SequenceLink]) -> Self {
        self.links = links;
        self
    }

    /// Also draw card outlines with titles
    #[must_use]
    pub fn with_cards(mut self, cards: bool) -> Self {
        self.cards = cards;
        self
    }

    fn write_defs(f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  <defs>")?;
        writeln!(
            f,
            r#"    <linearGradient id="lineGrad" x1="0" y1="0" x2="1" y2="0"><stop offset="0" stop-color="{GRADIENT_FROM}"/><stop offset="1" stop-color="{GRADIENT_TO}"/></linearGradient>"#
        )?;
        writeln!(
            f,
            r#"    <filter id="softGlow"><feGaussianBlur stdDeviation="2.2" result="blur"/><feMerge><feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#
        )?;
        writeln!(f, "  </defs>")
    }

    fn write_cards(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for card in &self.view.cards {
            let Some(rect) = self.snapshot.get(card.id.as_str()) else {
                continue;
            };
            let stroke = if card.done { CARD_STROKE_DONE } else { CARD_STROKE };
            writeln!(
                f,
                r#"  <rect data-step="{}" x="{}" y="{}" width="{}" height="{}" rx="14" fill="{CARD_FILL}" stroke="{stroke}"/>"#,
                escape(card.id.as_str()),
                rect.x,
                rect.y,
                rect.width,
                rect.height
            )?;
            let mark = if card.done { " ✓" } else { "" };
            writeln!(
                f,
                r#"  <text x="{}" y="{}" fill="white" font-size="15">{}{mark}</text>"#,
                rect.x + 20.0,
                rect.y + 32.0,
                escape(&card.title)
            )?;
            writeln!(
                f,
                r#"  <text x="{}" y="{}" fill="white" opacity="0.6" font-size="12">{}</text>"#,
                rect.x + 20.0,
                rect.y + 56.0,
                escape(&card.badge)
            )?;
        }
        Ok(())
    }
}

impl Display for SvgOverlay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = self.snapshot.container_width();
        let height = self.snapshot.container_height();
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="connectorOverlay" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        Self::write_defs(f)?;

        if self.cards {
            self.write_cards(f)?;
        }

        let connectors = &self.view.connectors;
        if let Some(extent) = &connectors.extent {
            writeln!(
                f,
                r#"  <path class="axis" d="{}" stroke="{AXIS_STROKE}" stroke-width="2"/>"#,
                extent.to_svg()
            )?;
        }

        for link in self.links {
            writeln!(
                f,
                r#"  <path class="sequence" d="{}" fill="none" stroke="{LINK_STROKE}" stroke-width="1.5"/>"#,
                link.path
            )?;
        }

        for (id, point) in connectors.markers() {
            let card = self.view.card(id.as_str());
            let done = card.is_some_and(|c| c.done);
            let hot = card.is_some_and(|c| c.active);
            let fill = if done { MARKER_FILL_DONE } else { MARKER_FILL };
            let r = if hot { 7 } else { 5 };
            let glow = if hot { r#" filter="url(#softGlow)""# } else { "" };
            writeln!(
                f,
                r#"  <circle data-step="{}" cx="{}" cy="{}" r="{r}" fill="{fill}" opacity="0.9"{glow}/>"#,
                escape(id.as_str()),
                point.x,
                point.y
            )?;
        }

        for connector in &connectors.connectors {
            let card = self.view.card(connector.step_id.as_str());
            let done = card.is_some_and(|c| c.done);
            let hot = card.is_some_and(|c| c.active);
            let stroke = if done { CONNECTOR_STROKE_DONE } else { CONNECTOR_STROKE };
            let (stroke_width, opacity) = if hot { (3.2, 0.95) } else { (2.0, 0.55) };
            let glow = if hot { r#" filter="url(#softGlow)""# } else { "" };
            writeln!(
                f,
                r#"  <path data-step="{}" d="{}" fill="none" stroke="{stroke}" stroke-width="{stroke_width}" opacity="{opacity}"{glow}/>"#,
                escape(connector.step_id.as_str()),
                connector.path
            )?;
        }

        writeln!(f, "</svg>")
    }
}

/// Escape text for XML content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

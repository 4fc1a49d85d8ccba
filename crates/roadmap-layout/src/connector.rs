//! Connector geometry
//!
//! Turns a [`GeometrySnapshot`] into drawable curves. Everything here is a
//! pure function of its inputs.
//!
//! ```text
//!  ┌────────┐ start          │
//!  │  card  │──●~~~~~c1~~~~~~● end (axis_x, start.y)
//!  └────────┘                │
//!                            │ axis
//!                  end ●~~~~c1~~~~●──┌────────┐
//!                            │ start │  card  │
//!                            │       └────────┘
//! ```

use crate::geometry::{Point, Rect};
use crate::side::Side;
use crate::snapshot::GeometrySnapshot;
use roadmap_model::StepId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Tunable constants of connector geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorStyle {
    /// Gap between card edge and connector start
    pub outset: f64,
    /// Lower clamp of the card-to-axis bend
    pub bend_min: f64,
    /// Upper clamp of the card-to-axis bend
    pub bend_max: f64,
    /// Bend as a fraction of horizontal anchor distance
    pub bend_factor: f64,
    /// Axis extension above the topmost endpoint
    pub axis_pad_top: f64,
    /// Axis extension below the bottommost endpoint
    pub axis_pad_bottom: f64,
    /// Lower clamp of the card-to-card bend
    pub link_bend_min: f64,
    /// Upper clamp of the card-to-card bend
    pub link_bend_max: f64,
    /// Card-to-card bend as a fraction of horizontal distance
    pub link_bend_factor: f64,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            outset: 10.0,
            bend_min: 70.0,
            bend_max: 160.0,
            bend_factor: 0.6,
            axis_pad_top: 140.0,
            axis_pad_bottom: 220.0,
            link_bend_min: 90.0,
            link_bend_max: 180.0,
            link_bend_factor: 0.5,
        }
    }
}

/// Clamp `factor * distance` into `[min, max]`
///
/// NaN distances resolve to `min`.
#[inline]
fn clamped_bend(distance: f64, factor: f64, min: f64, max: f64) -> f64 {
    (distance * factor).max(min).min(max)
}

/// Bend magnitude for a card-to-axis connector
#[inline]
#[must_use]
pub fn bend_magnitude(start: Point, end: Point, style: &ConnectorStyle) -> f64 {
    clamped_bend((end.x - start.x).abs(), style.bend_factor, style.bend_min, style.bend_max)
}

/// Cubic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicPath {
    /// Start anchor
    pub start: Point,
    /// First control point
    pub control1: Point,
    /// Second control point
    pub control2: Point,
    /// End anchor
    pub end: Point,
}

impl CubicPath {
    /// Card-to-axis curve
    ///
    /// Leaves the card horizontally toward the axis, then sweeps onto it.
    /// The second control point sits on the end anchor.
    #[must_use]
    pub fn to_axis(start: Point, end: Point, side: Side, style: &ConnectorStyle) -> Self {
        let bend = bend_magnitude(start, end, style);
        Self {
            start,
            control1: start.offset_x(side.toward_axis() * bend),
            control2: end,
            end,
        }
    }

    /// Symmetric S-curve between two arbitrary points
    ///
    /// Both control points keep their anchor's y and lean toward the other
    /// anchor.
    #[must_use]
    pub fn smooth(start: Point, end: Point, style: &ConnectorStyle) -> Self {
        let bend = clamped_bend(
            (end.x - start.x).abs(),
            style.link_bend_factor,
            style.link_bend_min,
            style.link_bend_max,
        );
        let dir = if start.x < end.x { 1.0 } else { -1.0 };
        Self {
            start,
            control1: start.offset_x(dir * bend),
            control2: end.offset_x(-dir * bend),
            end,
        }
    }

    /// Point on the curve at parameter `t` in `[0, 1]`
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// SVG path data (`M x y C x y, x y, x y`)
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl Display for CubicPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} C {}, {}, {}",
            self.start, self.control1, self.control2, self.end
        )
    }
}

/// Curve from one card to the axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    /// Step the connector belongs to
    pub step_id: StepId,
    /// Position in the visible set
    pub index: usize,
    /// Side the card sits on
    pub side: Side,
    /// Curve geometry
    pub path: CubicPath,
}

impl Connector {
    /// Anchor on the card edge
    #[inline]
    #[must_use]
    pub fn start(&self) -> Point {
        self.path.start
    }

    /// Anchor on the axis
    #[inline]
    #[must_use]
    pub fn end(&self) -> Point {
        self.path.end
    }
}

/// Card-to-card curve between consecutive visible steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceLink {
    /// Earlier step
    pub from: StepId,
    /// Later step
    pub to: StepId,
    /// Curve geometry
    pub path: CubicPath,
}

/// Vertical span of the drawn axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisExtent {
    /// Axis x coordinate
    pub x: f64,
    /// Top end
    pub top: f64,
    /// Bottom end
    pub bottom: f64,
}

impl AxisExtent {
    /// Length of the axis
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether `y` lies within the span
    #[inline]
    #[must_use]
    pub fn contains(&self, y: f64) -> bool {
        (self.top..=self.bottom).contains(&y)
    }

    /// SVG path data for the axis line
    #[must_use]
    pub fn to_svg(&self) -> String {
        format!("M {} {} L {} {}", self.x, self.top, self.x, self.bottom)
    }
}

/// Everything needed to draw the overlay for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorSet {
    /// Axis x coordinate (container width / 2)
    pub axis_x: f64,
    /// One connector per visible measured step, in visible order
    pub connectors: Vec<Connector>,
    /// Axis span; `None` when nothing is measured
    pub extent: Option<AxisExtent>,
}

impl ConnectorSet {
    /// Set with no connectors
    #[must_use]
    pub fn empty(axis_x: f64) -> Self {
        Self {
            axis_x,
            connectors: Vec::new(),
            extent: None,
        }
    }

    /// Axis markers: one point per connector, on the axis
    pub fn markers(&self) -> impl Iterator<Item = (&StepId, Point)> {
        self.connectors.iter().map(|c| (&c.step_id, c.end()))
    }

    /// Connector for a step
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.step_id.as_str() == id)
    }

    /// Number of connectors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// Check if there are no connectors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

/// Start anchor on the axis-facing edge of `rect`, at its vertical midpoint
#[inline]
#[must_use]
pub fn card_anchor(rect: &Rect, side: Side, style: &ConnectorStyle) -> Point {
    let x = match side {
        Side::Left => rect.right() + style.outset,
        Side::Right => rect.x - style.outset,
    };
    Point::new(x, rect.mid_y())
}

/// Build one connector per visible measured step
///
/// Steps without a rectangle in `snapshot` are skipped.
#[must_use]
pub fn build_connectors(
    snapshot: &GeometrySnapshot,
    visible: &[StepId],
    style: &ConnectorStyle,
) -> ConnectorSet {
    let axis_x = snapshot.container_width() / 2.0;

    let connectors: Vec<Connector> = visible
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let rect = snapshot.get(id.as_str())?;
            let side = Side::for_index(index);
            let start = card_anchor(rect, side, style);
            let end = Point::new(axis_x, start.y);
            Some(Connector {
                step_id: id.clone(),
                index,
                side,
                path: CubicPath::to_axis(start, end, side, style),
            })
        })
        .collect();

    let extent = axis_extent(axis_x, connectors.iter().map(|c| c.end().y), style);

    ConnectorSet {
        axis_x,
        connectors,
        extent,
    }
}

/// Axis span over endpoint heights plus the style pads
///
/// `None` for an empty iterator.
#[must_use]
pub fn axis_extent(
    axis_x: f64,
    ys: impl IntoIterator<Item = f64>,
    style: &ConnectorStyle,
) -> Option<AxisExtent> {
    let (min, max) = ys.into_iter().fold(None, |acc: Option<(f64, f64)>, y| {
        Some(match acc {
            Some((lo, hi)) => (lo.min(y), hi.max(y)),
            None => (y, y),
        })
    })?;

    Some(AxisExtent {
        x: axis_x,
        top: min - style.axis_pad_top,
        bottom: max + style.axis_pad_bottom,
    })
}

/// Curves linking each visible measured step to the next measured one
#[must_use]
pub fn build_sequence_links(
    snapshot: &GeometrySnapshot,
    visible: &[StepId],
    style: &ConnectorStyle,
) -> Vec<SequenceLink> {
    let anchors: Vec<(&StepId, Point)> = visible
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let rect = snapshot.get(id.as_str())?;
            Some((id, card_anchor(rect, Side::for_index(index), style)))
        })
        .collect();

    anchors
        .windows(2)
        .map(|pair| SequenceLink {
            from: pair[0].0.clone(),
            to: pair[1].0.clone(),
            path: CubicPath::smooth(pair[0].1, pair[1].1, style),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn snapshot(width: f64, rects: &[(&str, Rect)]) -> GeometrySnapshot {
        let map: IndexMap<StepId, Rect> =
            rects.iter().map(|(id, r)| (StepId::from(*id), *r)).collect();
        GeometrySnapshot::new(width, 2000.0, map)
    }

    fn ids(list: &[&str]) -> Vec<StepId> {
        list.iter().map(|s| StepId::from(*s)).collect()
    }

    #[test]
    fn left_card_connects_from_right_edge() {
        let style = ConnectorStyle::default();
        let snap = snapshot(1000.0, &[("a", Rect::new(0.0, 100.0, 300.0, 80.0))]);
        let set = build_connectors(&snap, &ids(&["a"]), &style);

        let c = &set.connectors[0];
        assert_eq!(c.side, Side::Left);
        assert_eq!(c.start(), Point::new(310.0, 140.0));
        assert_eq!(c.end(), Point::new(500.0, 140.0));
        // distance 190 * 0.6 = 114
        assert_eq!(c.path.control1, Point::new(424.0, 140.0));
        assert_eq!(c.path.control2, c.end());
    }

    #[test]
    fn right_card_connects_from_left_edge() {
        let style = ConnectorStyle::default();
        let snap = snapshot(
            1000.0,
            &[
                ("a", Rect::new(0.0, 0.0, 300.0, 80.0)),
                ("b", Rect::new(700.0, 200.0, 300.0, 100.0)),
            ],
        );
        let set = build_connectors(&snap, &ids(&["a", "b"]), &style);

        let c = set.get("b").unwrap();
        assert_eq!(c.side, Side::Right);
        assert_eq!(c.start(), Point::new(690.0, 250.0));
        // distance 190 -> bend 114, leaning left toward the axis
        assert_eq!(c.path.control1, Point::new(576.0, 250.0));
    }

    #[test]
    fn bend_is_clamped_at_both_ends() {
        let style = ConnectorStyle::default();
        let near = bend_magnitude(Point::new(0.0, 0.0), Point::new(10.0, 0.0), &style);
        let far = bend_magnitude(Point::new(0.0, 0.0), Point::new(1000.0, 0.0), &style);
        assert_eq!(near, 70.0);
        assert_eq!(far, 160.0);
    }

    #[test]
    fn svg_path_format() {
        let path = CubicPath {
            start: Point::new(310.0, 140.0),
            control1: Point::new(424.0, 140.0),
            control2: Point::new(500.0, 140.0),
            end: Point::new(500.0, 140.0),
        };
        assert_eq!(path.to_svg(), "M 310 140 C 424 140, 500 140, 500 140");
    }

    #[test]
    fn scenario_three_steps_alternate_sides() {
        let style = ConnectorStyle::default();
        let snap = snapshot(
            1000.0,
            &[
                ("a", Rect::new(0.0, 0.0, 300.0, 100.0)),
                ("b", Rect::new(700.0, 150.0, 300.0, 100.0)),
                ("c", Rect::new(0.0, 300.0, 300.0, 100.0)),
            ],
        );
        let set = build_connectors(&snap, &ids(&["a", "b", "c"]), &style);
        let sides: Vec<Side> = set.connectors.iter().map(|c| c.side).collect();
        assert_eq!(sides, vec![Side::Left, Side::Right, Side::Left]);

        let extent = set.extent.unwrap();
        assert_eq!(extent.top, 50.0 - 140.0);
        assert_eq!(extent.bottom, 350.0 + 220.0);
    }

    #[test]
    fn empty_visible_set_has_no_axis() {
        let style = ConnectorStyle::default();
        let snap = snapshot(1000.0, &[]);
        let set = build_connectors(&snap, &[], &style);
        assert!(set.is_empty());
        assert!(set.extent.is_none());
        assert_eq!(set.axis_x, 500.0);
    }

    #[test]
    fn unmeasured_steps_produce_no_connector_but_keep_indices() {
        let style = ConnectorStyle::default();
        let snap = snapshot(1000.0, &[("c", Rect::new(0.0, 300.0, 300.0, 100.0))]);
        let set = build_connectors(&snap, &ids(&["a", "b", "c"]), &style);
        assert_eq!(set.len(), 1);
        assert_eq!(set.connectors[0].index, 2);
        assert_eq!(set.connectors[0].side, Side::Left);
    }

    #[test]
    fn sequence_links_join_consecutive_measured_cards() {
        let style = ConnectorStyle::default();
        let snap = snapshot(
            1000.0,
            &[
                ("a", Rect::new(0.0, 0.0, 300.0, 100.0)),
                ("c", Rect::new(0.0, 300.0, 300.0, 100.0)),
            ],
        );
        let links = build_sequence_links(&snap, &ids(&["a", "b", "c"]), &style);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].from.as_str(), "a");
        assert_eq!(links[0].to.as_str(), "c");
    }

    #[test]
    fn smooth_path_is_symmetric() {
        let style = ConnectorStyle::default();
        let p = CubicPath::smooth(Point::new(0.0, 0.0), Point::new(400.0, 100.0), &style);
        // 400 * 0.5 = 200 -> clamped to 180
        assert_eq!(p.control1, Point::new(180.0, 0.0));
        assert_eq!(p.control2, Point::new(220.0, 100.0));
    }

    #[test]
    fn curve_endpoints_match_anchors() {
        let style = ConnectorStyle::default();
        let p = CubicPath::to_axis(Point::new(10.0, 5.0), Point::new(300.0, 5.0), Side::Left, &style);
        assert_eq!(p.point_at(0.0), p.start);
        assert_eq!(p.point_at(1.0), p.end);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (0.0..2000.0f64, 0.0..5000.0f64, 1.0..600.0f64, 1.0..400.0f64)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_bend_within_clamp(
            ax in -5000.0..5000.0f64,
            bx in -5000.0..5000.0f64,
            y in -100.0..100.0f64,
        ) {
            let style = ConnectorStyle::default();
            let bend = bend_magnitude(Point::new(ax, y), Point::new(bx, y), &style);
            prop_assert!((70.0..=160.0).contains(&bend));
        }

        #[test]
        fn prop_build_is_deterministic(
            rects in prop::collection::vec(arb_rect(), 0..16),
            width in 320.0..2400.0f64,
        ) {
            let style = ConnectorStyle::default();
            let named: Vec<(String, Rect)> = rects
                .iter()
                .enumerate()
                .map(|(i, r)| (format!("s{i}"), *r))
                .collect();
            let borrowed: Vec<(&str, Rect)> = named.iter().map(|(id, r)| (id.as_str(), *r)).collect();
            let snap = snapshot(width, &borrowed);
            let visible: Vec<StepId> = named.iter().map(|(id, _)| StepId::from(id.as_str())).collect();

            let first = build_connectors(&snap, &visible, &style);
            let second = build_connectors(&snap, &visible, &style);
            prop_assert_eq!(&first, &second);

            // connectors end on the axis at their start height
            for c in &first.connectors {
                prop_assert_eq!(c.end().x, width / 2.0);
                prop_assert_eq!(c.end().y, c.start().y);
            }

            // extent covers every endpoint
            if let Some(extent) = first.extent {
                for c in &first.connectors {
                    prop_assert!(extent.contains(c.end().y));
                }
            } else {
                prop_assert!(first.connectors.is_empty());
            }
        }

        #[test]
        fn prop_extent_grows_to_include_new_midpoint(
            rects in prop::collection::vec(arb_rect(), 1..8),
            extra in arb_rect(),
        ) {
            let style = ConnectorStyle::default();
            let mut named: Vec<(String, Rect)> = rects
                .iter()
                .enumerate()
                .map(|(i, r)| (format!("s{i}"), *r))
                .collect();

            let build = |named: &[(String, Rect)]| {
                let borrowed: Vec<(&str, Rect)> = named.iter().map(|(id, r)| (id.as_str(), *r)).collect();
                let snap = snapshot(1200.0, &borrowed);
                let visible: Vec<StepId> = named.iter().map(|(id, _)| StepId::from(id.as_str())).collect();
                build_connectors(&snap, &visible, &style)
            };

            let before = build(&named).extent.unwrap();
            named.push(("extra".to_string(), extra));
            let after = build(&named).extent.unwrap();

            let mid = extra.mid_y();
            prop_assert!(after.top <= before.top);
            prop_assert!(after.bottom >= before.bottom);
            prop_assert!(after.top <= mid - style.axis_pad_top);
            prop_assert!(after.bottom >= mid + style.axis_pad_bottom);
            if mid - style.axis_pad_top < before.top {
                prop_assert!(after.top < before.top);
            }
            if mid + style.axis_pad_bottom > before.bottom {
                prop_assert!(after.bottom > before.bottom);
            }
        }
    }
}

//! Bezier pen paths and the in-progress pen session.

use super::{AnnotationId, AnnotationShape, AnnotationStyle};
use crate::geometry::CloseThreshold;
use kurbo::{BezPath, ParamCurveNearest, Point, Rect, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an anchor's two handles relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    /// Handles mirror each other through the anchor.
    #[default]
    Smooth,
    /// Handles move independently.
    Corner,
}

impl AnchorKind {
    pub fn toggled(self) -> Self {
        match self {
            AnchorKind::Smooth => AnchorKind::Corner,
            AnchorKind::Corner => AnchorKind::Smooth,
        }
    }
}

/// Which handle of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleSide {
    In,
    Out,
}

/// A control point with two tangent handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub point: Point,
    pub handle_in: Point,
    pub handle_out: Point,
    #[serde(default)]
    pub kind: AnchorKind,
}

impl Anchor {
    /// A smooth anchor with both handles on the anchor point.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            handle_in: point,
            handle_out: point,
            kind: AnchorKind::Smooth,
        }
    }

    pub fn handle(&self, side: HandleSide) -> Point {
        match side {
            HandleSide::In => self.handle_in,
            HandleSide::Out => self.handle_out,
        }
    }

    /// Move one handle. Smooth anchors mirror the opposite handle through
    /// the anchor point.
    pub fn set_handle(&mut self, side: HandleSide, position: Point) {
        let mirrored = self.point + (self.point - position);
        match side {
            HandleSide::In => {
                self.handle_in = position;
                if self.kind == AnchorKind::Smooth {
                    self.handle_out = mirrored;
                }
            }
            HandleSide::Out => {
                self.handle_out = position;
                if self.kind == AnchorKind::Smooth {
                    self.handle_in = mirrored;
                }
            }
        }
    }
}

fn anchors_to_path(anchors: &[Anchor], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = anchors.first() else {
        return path;
    };
    path.move_to(first.point);
    for pair in anchors.windows(2) {
        path.curve_to(pair[0].handle_out, pair[1].handle_in, pair[1].point);
    }
    if closed && anchors.len() > 2 {
        if let Some(last) = anchors.last() {
            path.curve_to(last.handle_out, first.handle_in, first.point);
        }
        path.close_path();
    }
    path
}

/// A finalized pen path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
    pub(crate) id: AnnotationId,
    anchors: Vec<Anchor>,
    pub closed: bool,
    pub style: AnnotationStyle,
}

impl BezierPath {
    pub fn new(anchors: Vec<Anchor>, closed: bool, style: AnnotationStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            closed: closed && anchors.len() > 2,
            anchors,
            style,
        }
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// SVG path data with cubic segments.
    pub fn to_svg_path_data(&self) -> String {
        self.to_path().to_svg()
    }
}

impl AnnotationShape for BezierPath {
    fn id(&self) -> AnnotationId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.to_path().bounding_box()
    }

    /// Near an anchor, or within `radius` of the curve itself.
    fn hit_test(&self, point: Point, radius: f64) -> bool {
        if self.anchors.iter().any(|a| a.point.distance(point) <= radius) {
            return true;
        }
        let reach = radius + self.style.stroke_width / 2.0;
        self.to_path()
            .segments()
            .any(|seg| seg.nearest(point, 1e-3).distance_sq <= reach * reach)
    }

    fn to_path(&self) -> BezPath {
        anchors_to_path(&self.anchors, self.closed)
    }

    fn style(&self) -> &AnnotationStyle {
        &self.style
    }
}

/// Outcome of a pen press.
#[derive(Debug, Clone, PartialEq)]
pub enum PenClick {
    /// A new anchor was appended; dragging now pulls out its handles.
    Added(usize),
    /// An existing anchor was selected.
    Selected(usize),
    /// A handle of the selected anchor is being dragged.
    HandleGrabbed(usize, HandleSide),
    /// An existing anchor switched between smooth and corner.
    KindToggled(usize),
    /// The press landed near the first anchor and closed the path.
    Closed(BezierPath),
}

/// Anchors placed with the pen tool that have not been committed yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenSession {
    anchors: Vec<Anchor>,
    selected: Option<usize>,
    dragging: Option<(usize, HandleSide)>,
    /// Pointer is hovering the first anchor, so Enter closes the path.
    closing: bool,
}

impl PenSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_dragging_handle(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    fn anchor_points(&self) -> Vec<Point> {
        self.anchors.iter().map(|a| a.point).collect()
    }

    /// Handle a pointer press in canvas space.
    ///
    /// `pick_radius` is in screen pixels; `toggle_kind` (Alt) flips the kind
    /// of an anchor under the pointer instead of selecting it.
    pub fn press(
        &mut self,
        point: Point,
        zoom: f64,
        threshold: &CloseThreshold,
        pick_radius: f64,
        toggle_kind: bool,
        style: AnnotationStyle,
    ) -> PenClick {
        if threshold.is_near_first_point(&self.anchor_points(), point, zoom) {
            if let Some(path) = self.finish(true, style) {
                return PenClick::Closed(path);
            }
        }

        let pick = pick_radius / zoom;
        if let Some(index) = self.selected {
            if let Some(anchor) = self.anchors.get(index) {
                for side in [HandleSide::Out, HandleSide::In] {
                    if anchor.handle(side).distance(point) < pick {
                        self.dragging = Some((index, side));
                        return PenClick::HandleGrabbed(index, side);
                    }
                }
            }
        }

        if let Some(index) = self.anchors.iter().position(|a| a.point.distance(point) < pick) {
            if toggle_kind {
                self.anchors[index].kind = self.anchors[index].kind.toggled();
                return PenClick::KindToggled(index);
            }
            self.selected = Some(index);
            return PenClick::Selected(index);
        }

        self.anchors.push(Anchor::new(point));
        let index = self.anchors.len() - 1;
        self.selected = Some(index);
        self.dragging = Some((index, HandleSide::Out));
        PenClick::Added(index)
    }

    /// Move the grabbed handle. Returns whether a handle moved.
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some((index, side)) = self.dragging else {
            return false;
        };
        match self.anchors.get_mut(index) {
            Some(anchor) => {
                anchor.set_handle(side, point);
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.dragging = None;
    }

    /// Track hover to know whether Enter should close the path.
    pub fn hover(&mut self, point: Point, zoom: f64, threshold: &CloseThreshold) -> bool {
        self.closing = threshold.is_near_first_point(&self.anchor_points(), point, zoom);
        self.closing
    }

    /// Take the anchors as a finished path. Fewer than two anchors are
    /// discarded.
    pub fn finish(&mut self, closed: bool, style: AnnotationStyle) -> Option<BezierPath> {
        let anchors = std::mem::take(&mut self.anchors);
        self.cancel();
        (anchors.len() >= 2).then(|| BezierPath::new(anchors, closed, style))
    }

    /// Enter: finish, closed when hovering the first anchor.
    pub fn commit(&mut self, style: AnnotationStyle) -> Option<BezierPath> {
        let closed = self.closing;
        self.finish(closed, style)
    }

    /// Backspace: drop the most recent anchor.
    pub fn remove_last(&mut self) -> Option<Anchor> {
        let removed = self.anchors.pop();
        self.closing = false;
        self.dragging = None;
        if self.selected.is_some_and(|i| i >= self.anchors.len()) {
            self.selected = None;
        }
        removed
    }

    /// Escape: discard every uncommitted anchor.
    pub fn cancel(&mut self) {
        self.anchors.clear();
        self.selected = None;
        self.dragging = None;
        self.closing = false;
    }

    /// Path of the anchors placed so far, for live preview.
    pub fn preview_path(&self) -> BezPath {
        anchors_to_path(&self.anchors, self.closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(session: &mut PenSession, x: f64, y: f64) -> PenClick {
        session.press(
            Point::new(x, y),
            1.0,
            &CloseThreshold::default(),
            8.0,
            false,
            AnnotationStyle::default(),
        )
    }

    #[test]
    fn test_smooth_handle_mirrors() {
        let mut anchor = Anchor::new(Point::new(50.0, 50.0));
        anchor.set_handle(HandleSide::Out, Point::new(70.0, 40.0));
        assert_eq!(anchor.handle_in, Point::new(30.0, 60.0));
    }

    #[test]
    fn test_corner_handle_independent() {
        let mut anchor = Anchor::new(Point::new(50.0, 50.0));
        anchor.kind = AnchorKind::Corner;
        anchor.set_handle(HandleSide::In, Point::new(40.0, 40.0));
        assert_eq!(anchor.handle_out, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_press_adds_then_drag_pulls_handle() {
        let mut session = PenSession::new();
        assert_eq!(press(&mut session, 0.0, 0.0), PenClick::Added(0));
        assert!(session.drag_to(Point::new(10.0, 0.0)));
        session.release();
        let anchor = session.anchors()[0];
        assert_eq!(anchor.handle_out, Point::new(10.0, 0.0));
        assert_eq!(anchor.handle_in, Point::new(-10.0, 0.0));
        assert!(!session.drag_to(Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_press_on_existing_anchor_selects() {
        let mut session = PenSession::new();
        press(&mut session, 0.0, 0.0);
        session.release();
        press(&mut session, 100.0, 0.0);
        session.release();
        assert_eq!(press(&mut session, 2.0, 1.0), PenClick::Selected(0));
        assert_eq!(session.anchors().len(), 2);
    }

    #[test]
    fn test_press_on_selected_anchor_grabs_handle() {
        let mut session = PenSession::new();
        press(&mut session, 0.0, 0.0);
        session.release();
        assert_eq!(
            press(&mut session, 1.0, 0.0),
            PenClick::HandleGrabbed(0, HandleSide::Out)
        );
    }

    #[test]
    fn test_close_near_first_anchor() {
        let mut session = PenSession::new();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            press(&mut session, x, y);
            session.release();
        }
        match press(&mut session, 15.0, 10.0) {
            PenClick::Closed(path) => {
                assert!(path.closed);
                assert_eq!(path.anchors().len(), 3);
            }
            other => panic!("expected close, got {other:?}"),
        }
        assert!(session.is_empty());
    }

    #[test]
    fn test_commit_uses_hover_state() {
        let mut session = PenSession::new();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            press(&mut session, x, y);
            session.release();
        }
        assert!(session.hover(Point::new(5.0, 5.0), 1.0, &CloseThreshold::default()));
        let path = session.commit(AnnotationStyle::default()).unwrap();
        assert!(path.closed);
    }

    #[test]
    fn test_commit_open_and_too_short() {
        let mut session = PenSession::new();
        press(&mut session, 0.0, 0.0);
        session.release();
        assert!(session.commit(AnnotationStyle::default()).is_none());

        press(&mut session, 0.0, 0.0);
        session.release();
        press(&mut session, 100.0, 0.0);
        session.release();
        let path = session.commit(AnnotationStyle::default()).unwrap();
        assert!(!path.closed);
    }

    #[test]
    fn test_remove_last_and_cancel() {
        let mut session = PenSession::new();
        press(&mut session, 0.0, 0.0);
        press(&mut session, 100.0, 0.0);
        assert!(session.remove_last().is_some());
        assert_eq!(session.anchors().len(), 1);
        assert_eq!(session.selected(), None);
        session.cancel();
        assert!(session.is_empty());
    }

    #[test]
    fn test_alt_press_toggles_kind() {
        let mut session = PenSession::new();
        press(&mut session, 0.0, 0.0);
        session.release();
        press(&mut session, 100.0, 0.0);
        session.release();
        let click = session.press(
            Point::new(0.0, 0.0),
            1.0,
            &CloseThreshold::default(),
            8.0,
            true,
            AnnotationStyle::default(),
        );
        assert_eq!(click, PenClick::KindToggled(0));
        assert_eq!(session.anchors()[0].kind, AnchorKind::Corner);
    }

    #[test]
    fn test_bezier_path_hit_on_curve() {
        let anchors = vec![Anchor::new(Point::new(0.0, 0.0)), Anchor::new(Point::new(100.0, 0.0))];
        let path = BezierPath::new(anchors, false, AnnotationStyle::default());
        assert!(path.hit_test(Point::new(50.0, 5.0), 10.0));
        assert!(!path.hit_test(Point::new(50.0, 40.0), 10.0));
    }
}

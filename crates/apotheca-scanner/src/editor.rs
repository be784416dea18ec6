// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner editor — the four draggable handles over the captured image.
//
// The editor knows nothing about UI events: whatever input layer the host has
// calls begin/move/end with plain coordinates.

use apotheca_core::error::{Result, ScanError};
use apotheca_core::types::{CornerSet, NormalizedPoint};
use tracing::trace;

/// Bounding box of the element displaying the captured image, in the same
/// client coordinate space as the pointer/touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    /// Project a client coordinate into `[0, 1]²` relative to this box.
    /// `None` when the box has no area.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> Option<NormalizedPoint> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        Some(NormalizedPoint::clamped(
            (client_x - self.left) / self.width,
            (client_y - self.top) / self.height,
        ))
    }
}

/// Which input layer a move event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Mouse/pen: moves only apply to the corner grabbed in `begin_drag`.
    Pointer,
    /// Single touch: the event names its corner directly.
    Touch,
}

/// Holds the user's quadrilateral and which handle (if any) is being dragged.
#[derive(Debug, Clone, Default)]
pub struct CornerEditor {
    corners: CornerSet,
    active: Option<usize>,
}

impl CornerEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn corners(&self) -> &CornerSet {
        &self.corners
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Back to the default inset quadrilateral, no active drag.
    pub fn reset(&mut self) {
        self.corners = CornerSet::default();
        self.active = None;
    }

    /// Grab corner `index`. Replaces any previously active corner.
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        if index >= self.corners.points().len() {
            return Err(ScanError::InvalidCorner(index));
        }
        self.active = Some(index);
        Ok(())
    }

    /// Move corner `index` under the input at `(client_x, client_y)`.
    ///
    /// Returns the new position, or `None` when the move was ignored: no drag
    /// in progress, a pointer move for a corner other than the active one, an
    /// out-of-range index, or a display box with no area.
    pub fn move_drag(
        &mut self,
        index: usize,
        client_x: f64,
        client_y: f64,
        display: DisplayRect,
        input: InputKind,
    ) -> Option<NormalizedPoint> {
        let active = self.active?;
        if input == InputKind::Pointer && index != active {
            return None;
        }
        let target = display.normalize(client_x, client_y)?;
        let moved = self.corners.move_corner(index, target.x, target.y).ok()?;
        trace!(index, x = moved.x, y = moved.y, "Corner moved");
        Some(moved)
    }

    /// Release the active corner; later moves are ignored until the next
    /// `begin_drag`.
    pub fn end_drag(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_core::types::Corner;

    const DISPLAY: DisplayRect = DisplayRect {
        left: 100.0,
        top: 50.0,
        width: 400.0,
        height: 300.0,
    };

    #[test]
    fn move_projects_into_display_box() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(0).unwrap();
        let p = editor
            .move_drag(0, 200.0, 125.0, DISPLAY, InputKind::Pointer)
            .unwrap();
        assert!((p.x - 0.25).abs() < 1e-12);
        assert!((p.y - 0.25).abs() < 1e-12);
    }

    #[test]
    fn moves_far_outside_the_box_are_clamped() {
        let mut editor = CornerEditor::new();
        let inputs = [
            (-1e9, -1e9),
            (1e9, 1e9),
            (-5.0, 4000.0),
            (f64::INFINITY, f64::NEG_INFINITY),
            (f64::NAN, 260.0),
        ];
        for index in 0..4 {
            editor.begin_drag(index).unwrap();
            for (x, y) in inputs {
                editor.move_drag(index, x, y, DISPLAY, InputKind::Pointer);
                for p in editor.corners().points() {
                    assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
                }
            }
            editor.end_drag();
        }
    }

    #[test]
    fn dragging_one_corner_leaves_the_others_alone() {
        let mut editor = CornerEditor::new();
        let moves = [(3, 120.0, 60.0), (1, 480.0, 340.0), (0, 300.0, 200.0), (2, 0.0, 0.0)];
        for (index, x, y) in moves {
            let before = *editor.corners().points();
            editor.begin_drag(index).unwrap();
            editor.move_drag(index, x, y, DISPLAY, InputKind::Pointer).unwrap();
            editor.end_drag();
            for other in (0..4).filter(|i| *i != index) {
                assert_eq!(editor.corners().points()[other], before[other]);
            }
        }
        // Winding order is positional: whatever was dragged where, index 0 is
        // still the top-left handle.
        assert_eq!(
            editor.corners().get(Corner::TopLeft),
            editor.corners().points()[0]
        );
    }

    #[test]
    fn pointer_moves_for_inactive_corner_are_ignored() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(1).unwrap();
        assert!(editor.move_drag(2, 300.0, 200.0, DISPLAY, InputKind::Pointer).is_none());
        assert_eq!(editor.corners(), &CornerSet::default());
    }

    #[test]
    fn touch_moves_address_corner_directly() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(1).unwrap();
        let p = editor
            .move_drag(2, 300.0, 200.0, DISPLAY, InputKind::Touch)
            .unwrap();
        assert_eq!(editor.corners().points()[2], p);
    }

    #[test]
    fn moves_after_end_drag_are_ignored() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(0).unwrap();
        editor.end_drag();
        assert!(editor.move_drag(0, 300.0, 200.0, DISPLAY, InputKind::Pointer).is_none());
        assert!(editor.move_drag(0, 300.0, 200.0, DISPLAY, InputKind::Touch).is_none());
        assert_eq!(editor.corners(), &CornerSet::default());
    }

    #[test]
    fn only_one_corner_is_active() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(0).unwrap();
        editor.begin_drag(3).unwrap();
        assert_eq!(editor.active(), Some(3));
        assert!(matches!(editor.begin_drag(4), Err(ScanError::InvalidCorner(4))));
        assert_eq!(editor.active(), Some(3));
    }

    #[test]
    fn empty_display_box_ignores_moves() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(0).unwrap();
        let collapsed = DisplayRect { width: 0.0, ..DISPLAY };
        assert!(editor.move_drag(0, 10.0, 10.0, collapsed, InputKind::Pointer).is_none());
    }

    #[test]
    fn reset_restores_default_quad() {
        let mut editor = CornerEditor::new();
        editor.begin_drag(2).unwrap();
        editor.move_drag(2, 0.0, 0.0, DISPLAY, InputKind::Pointer);
        editor.reset();
        assert_eq!(editor.corners(), &CornerSet::default());
        assert_eq!(editor.active(), None);
    }
}

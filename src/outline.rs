//! Access glyph outlines.
//!
//! Glyph outlines are delivered as a series of drawing callbacks on implementors of the
//! [OutlineSink] trait. A glyph is wrapped in a single
//! [begin_contour_set](OutlineSink::begin_contour_set) /
//! [end_contour_set](OutlineSink::end_contour_set) pair, and each contour starts with a
//! `move_to` and finishes with `close_contour`.
//!
//! ### Example
//!
//! This accumulates the drawing operations into a `String`. In a real application you'd
//! probably make calls to a graphics library instead.
//!
//! ```
//! use std::fmt::Write;
//!
//! use cff_outline::cff::charstring::{Instruction, Type2Op};
//! use cff_outline::cff::outline::Evaluator;
//! use cff_outline::outline::OutlineSink;
//! use cff_outline::pathfinder_geometry::line_segment::LineSegment2F;
//! use cff_outline::pathfinder_geometry::vector::Vector2F;
//!
//! struct DebugVisitor {
//!     outlines: String,
//! }
//!
//! impl OutlineSink for DebugVisitor {
//!     fn begin_contour_set(&mut self, _count: Option<usize>) {}
//!
//!     fn move_to(&mut self, to: Vector2F) {
//!         writeln!(&mut self.outlines, "move_to({}, {})", to.x(), to.y()).unwrap();
//!     }
//!
//!     fn line_to(&mut self, to: Vector2F) {
//!         writeln!(&mut self.outlines, "line_to({}, {})", to.x(), to.y()).unwrap();
//!     }
//!
//!     fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
//!         writeln!(
//!             &mut self.outlines,
//!             "curve_to({}, {}, {}, {}, {}, {})",
//!             ctrl.from_x(),
//!             ctrl.from_y(),
//!             ctrl.to_x(),
//!             ctrl.to_y(),
//!             to.x(),
//!             to.y()
//!         )
//!         .unwrap();
//!     }
//!
//!     fn close_contour(&mut self) {
//!         writeln!(&mut self.outlines, "close()").unwrap();
//!     }
//!
//!     fn end_contour_set(&mut self) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 100 100 rmoveto 50 hlineto endchar
//!     let instructions = [
//!         Instruction::load_int(100),
//!         Instruction::load_int(100),
//!         Instruction::op(Type2Op::RMoveTo),
//!         Instruction::load_int(50),
//!         Instruction::op(Type2Op::HLineTo),
//!         Instruction::op(Type2Op::EndChar),
//!     ];
//!     let mut sink = DebugVisitor {
//!         outlines: String::new(),
//!     };
//!     Evaluator::new().evaluate(&instructions, &mut sink, 2.0)?;
//!
//!     let expected = "move_to(200, 200)
//! line_to(300, 200)
//! close()
//! ";
//!     assert_eq!(sink.outlines, expected);
//!     Ok(())
//! }
//! ```

use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::vector::Vector2F;

// `OutlineSink` is adapted from font-kit, font-kit/src/outline.rs:
//
// Copyright © 2020 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// A trait for visiting a glyph outline
pub trait OutlineSink {
    /// Starts the contours of a glyph. `count` is the number of contours when known ahead of
    /// time.
    fn begin_contour_set(&mut self, count: Option<usize>);
    /// Moves the pen to a point, starting a new contour.
    fn move_to(&mut self, to: Vector2F);
    /// Draws a line to a point.
    fn line_to(&mut self, to: Vector2F);
    /// Draws a cubic Bézier curve to a point.
    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F);
    /// Closes the contour, returning to the first point in it.
    fn close_contour(&mut self);
    /// Finishes the contours of a glyph.
    fn end_contour_set(&mut self);
}

/// An [OutlineSink] that multiplies every coordinate by a scale factor before forwarding it.
///
/// Also tracks whether a contour is open so callers can close it at the end of a glyph.
pub struct ScaledSink<'a, S: OutlineSink> {
    inner: &'a mut S,
    scale: f32,
    contour_open: bool,
}

impl<'a, S: OutlineSink> ScaledSink<'a, S> {
    pub fn new(inner: &'a mut S, scale: f32) -> Self {
        ScaledSink {
            inner,
            scale,
            contour_open: false,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_contour_open(&self) -> bool {
        self.contour_open
    }
}

impl<S: OutlineSink> OutlineSink for ScaledSink<'_, S> {
    fn begin_contour_set(&mut self, count: Option<usize>) {
        self.inner.begin_contour_set(count);
    }

    fn move_to(&mut self, to: Vector2F) {
        self.contour_open = true;
        self.inner.move_to(to * self.scale);
    }

    fn line_to(&mut self, to: Vector2F) {
        self.inner.line_to(to * self.scale);
    }

    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        let ctrl = LineSegment2F::new(ctrl.from() * self.scale, ctrl.to() * self.scale);
        self.inner.cubic_curve_to(ctrl, to * self.scale);
    }

    fn close_contour(&mut self) {
        self.contour_open = false;
        self.inner.close_contour();
    }

    fn end_contour_set(&mut self) {
        self.inner.end_contour_set();
    }
}

#[cfg(test)]
mod tests {
    use pathfinder_geometry::vector::vec2f;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        points: Vec<Vector2F>,
        closes: usize,
    }

    impl OutlineSink for Recorder {
        fn begin_contour_set(&mut self, _count: Option<usize>) {}

        fn move_to(&mut self, to: Vector2F) {
            self.points.push(to);
        }

        fn line_to(&mut self, to: Vector2F) {
            self.points.push(to);
        }

        fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
            self.points.push(ctrl.from());
            self.points.push(ctrl.to());
            self.points.push(to);
        }

        fn close_contour(&mut self) {
            self.closes += 1;
        }

        fn end_contour_set(&mut self) {}
    }

    #[test]
    fn scales_all_points() {
        let mut recorder = Recorder::default();
        let mut sink = ScaledSink::new(&mut recorder, 0.5);
        sink.move_to(vec2f(10., 20.));
        sink.cubic_curve_to(
            LineSegment2F::new(vec2f(2., 4.), vec2f(6., 8.)),
            vec2f(100., -50.),
        );
        sink.close_contour();
        assert_eq!(
            recorder.points,
            vec![
                vec2f(5., 10.),
                vec2f(1., 2.),
                vec2f(3., 4.),
                vec2f(50., -25.)
            ]
        );
        assert_eq!(recorder.closes, 1);
    }

    #[test]
    fn tracks_open_contour() {
        let mut recorder = Recorder::default();
        let mut sink = ScaledSink::new(&mut recorder, 1.0);
        assert!(!sink.is_contour_open());
        sink.move_to(vec2f(0., 0.));
        assert!(sink.is_contour_open());
        sink.close_contour();
        assert!(!sink.is_contour_open());
    }
}

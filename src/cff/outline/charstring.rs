// This file is derived from ttf-parser, licenced under Apache-2.0.
// https://github.com/RazrFalcon/ttf-parser/blob/439aaaebd50eb8aed66302e3c1b51fae047f85b2/src/tables/cff/charstring.rs

use pathfinder_geometry::line_segment::LineSegment2F;
use pathfinder_geometry::vector::vec2f;

use crate::cff::CFFError;
use crate::outline::{OutlineSink, ScaledSink};

use super::EvaluationStack;

trait IsEven {
    fn is_odd(&self) -> bool;
}

impl IsEven for usize {
    fn is_odd(&self) -> bool {
        self % 2 == 1
    }
}

/// Forwards path segments at absolute positions to the sink.
struct Builder<'a, 's, S: OutlineSink> {
    sink: &'a mut ScaledSink<'s, S>,
}

impl<S: OutlineSink> Builder<'_, '_, S> {
    // Every character path and subpath must begin with one of the moveto operators. If the
    // current path is open when a moveto operator is encountered, the path is closed before
    // performing the moveto operation.
    fn move_to(&mut self, x: f32, y: f32) {
        self.close();
        self.sink.move_to(vec2f(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.sink.line_to(vec2f(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let from = vec2f(x1, y1);
        let to = vec2f(x2, y2);
        self.sink
            .cubic_curve_to(LineSegment2F::new(from, to), vec2f(x, y))
    }

    fn close(&mut self) {
        if self.sink.is_contour_open() {
            self.sink.close_contour();
        }
    }
}

impl EvaluationStack {
    pub fn parse_move_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dy1

        if self.stack.len() != 2 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        self.x += self.stack.at(0);
        self.y += self.stack.at(1);
        Builder { sink }.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_horizontal_move_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1

        if self.stack.len() != 1 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        self.x += self.stack.at(0);
        Builder { sink }.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_vertical_move_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dy1

        if self.stack.len() != 1 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        self.y += self.stack.at(0);
        Builder { sink }.move_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_line_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // {dxa dya}+

        if self.stack.len().is_odd() {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() {
            self.x += self.stack.at(i + 0);
            self.y += self.stack.at(i + 1);
            builder.line_to(self.x, self.y);
            i += 2;
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_horizontal_line_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 {dya dxb}*
        //     {dxa dyb}+

        if self.stack.is_empty() {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() {
            self.x += self.stack.at(i);
            i += 1;
            builder.line_to(self.x, self.y);

            if i == self.stack.len() {
                break;
            }

            self.y += self.stack.at(i);
            i += 1;
            builder.line_to(self.x, self.y);
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_vertical_line_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dy1 {dxa dyb}*
        //     {dya dxb}+

        if self.stack.is_empty() {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() {
            self.y += self.stack.at(i);
            i += 1;
            builder.line_to(self.x, self.y);

            if i == self.stack.len() {
                break;
            }

            self.x += self.stack.at(i);
            i += 1;
            builder.line_to(self.x, self.y);
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_curve_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // {dxa dya dxb dyb dxc dyc}+

        if self.stack.len() % 6 != 0 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() {
            let x1 = self.x + self.stack.at(i + 0);
            let y1 = self.y + self.stack.at(i + 1);
            let x2 = x1 + self.stack.at(i + 2);
            let y2 = y1 + self.stack.at(i + 3);
            self.x = x2 + self.stack.at(i + 4);
            self.y = y2 + self.stack.at(i + 5);

            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            i += 6;
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_curve_line<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // {dxa dya dxb dyb dxc dyc}+ dxd dyd

        if self.stack.len() < 8 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        if (self.stack.len() - 2) % 6 != 0 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() - 2 {
            let x1 = self.x + self.stack.at(i + 0);
            let y1 = self.y + self.stack.at(i + 1);
            let x2 = x1 + self.stack.at(i + 2);
            let y2 = y1 + self.stack.at(i + 3);
            self.x = x2 + self.stack.at(i + 4);
            self.y = y2 + self.stack.at(i + 5);

            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            i += 6;
        }

        self.x += self.stack.at(i + 0);
        self.y += self.stack.at(i + 1);
        builder.line_to(self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_line_curve<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // {dxa dya}+ dxb dyb dxc dyc dxd dyd

        if self.stack.len() < 8 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        if (self.stack.len() - 6).is_odd() {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        let mut i = 0;
        while i < self.stack.len() - 6 {
            self.x += self.stack.at(i + 0);
            self.y += self.stack.at(i + 1);

            builder.line_to(self.x, self.y);
            i += 2;
        }

        let x1 = self.x + self.stack.at(i + 0);
        let y1 = self.y + self.stack.at(i + 1);
        let x2 = x1 + self.stack.at(i + 2);
        let y2 = y1 + self.stack.at(i + 3);
        self.x = x2 + self.stack.at(i + 4);
        self.y = y2 + self.stack.at(i + 5);
        builder.curve_to(x1, y1, x2, y2, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_hh_curve_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dy1? {dxa dxb dyb dxc}+

        let mut i = 0;

        // The odd argument count indicates an Y position.
        if self.stack.len().is_odd() {
            self.y += self.stack.at(0);
            i += 1;
        }

        if (self.stack.len() - i) % 4 != 0 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        while i < self.stack.len() {
            let x1 = self.x + self.stack.at(i + 0);
            let y1 = self.y;
            let x2 = x1 + self.stack.at(i + 1);
            let y2 = y1 + self.stack.at(i + 2);
            self.x = x2 + self.stack.at(i + 3);
            self.y = y2;

            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            i += 4;
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_vv_curve_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1? {dya dxb dyb dyc}+

        let mut i = 0;

        // The odd argument count indicates an X position.
        if self.stack.len().is_odd() {
            self.x += self.stack.at(0);
            i += 1;
        }

        if (self.stack.len() - i) % 4 != 0 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        while i < self.stack.len() {
            let x1 = self.x;
            let y1 = self.y + self.stack.at(i + 0);
            let x2 = x1 + self.stack.at(i + 1);
            let y2 = y1 + self.stack.at(i + 2);
            self.x = x2;
            self.y = y2 + self.stack.at(i + 3);

            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            i += 4;
        }

        self.stack.clear();
        Ok(())
    }

    pub fn parse_hv_curve_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dx2 dy2 dy3 {dya dxb dyb dxc dxd dxe dye dyf}* dxf?
        //                 {dxa dxb dyb dyc dyd dxe dye dxf}+ dyf?

        if self.stack.len() < 4 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        self.stack.reverse();
        while !self.stack.is_empty() {
            if self.stack.len() < 4 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let x1 = self.x + self.stack.pop();
            let y1 = self.y;
            let x2 = x1 + self.stack.pop();
            let y2 = y1 + self.stack.pop();
            self.y = y2 + self.stack.pop();
            self.x = x2
                + if self.stack.len() == 1 {
                    self.stack.pop()
                } else {
                    0.0
                };
            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            if self.stack.is_empty() {
                break;
            }

            if self.stack.len() < 4 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let x1 = self.x;
            let y1 = self.y + self.stack.pop();
            let x2 = x1 + self.stack.pop();
            let y2 = y1 + self.stack.pop();
            self.x = x2 + self.stack.pop();
            self.y = y2
                + if self.stack.len() == 1 {
                    self.stack.pop()
                } else {
                    0.0
                };
            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
        }

        debug_assert!(self.stack.is_empty());
        Ok(())
    }

    pub fn parse_vh_curve_to<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dy1 dx2 dy2 dx3 {dxa dxb dyb dyc dyd dxe dye dxf}* dyf?
        //                 {dya dxb dyb dxc dxd dxe dye dyf}+ dxf?

        if self.stack.len() < 4 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let mut builder = Builder { sink };
        self.stack.reverse();
        while !self.stack.is_empty() {
            if self.stack.len() < 4 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let x1 = self.x;
            let y1 = self.y + self.stack.pop();
            let x2 = x1 + self.stack.pop();
            let y2 = y1 + self.stack.pop();
            self.x = x2 + self.stack.pop();
            self.y = y2
                + if self.stack.len() == 1 {
                    self.stack.pop()
                } else {
                    0.0
                };
            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
            if self.stack.is_empty() {
                break;
            }

            if self.stack.len() < 4 {
                return Err(CFFError::InvalidArgumentsStackLength);
            }

            let x1 = self.x + self.stack.pop();
            let y1 = self.y;
            let x2 = x1 + self.stack.pop();
            let y2 = y1 + self.stack.pop();
            self.y = y2 + self.stack.pop();
            self.x = x2
                + if self.stack.len() == 1 {
                    self.stack.pop()
                } else {
                    0.0
                };
            builder.curve_to(x1, y1, x2, y2, self.x, self.y);
        }

        debug_assert!(self.stack.is_empty());
        Ok(())
    }

    // The flex operators always render as two curves, the flex depth is not consulted.

    pub fn parse_flex<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dy1 dx2 dy2 dx3 dy3 dx4 dy4 dx5 dy5 dx6 dy6 fd

        if self.stack.len() != 13 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let dx1 = self.x + self.stack.at(0);
        let dy1 = self.y + self.stack.at(1);
        let dx2 = dx1 + self.stack.at(2);
        let dy2 = dy1 + self.stack.at(3);
        let dx3 = dx2 + self.stack.at(4);
        let dy3 = dy2 + self.stack.at(5);
        let dx4 = dx3 + self.stack.at(6);
        let dy4 = dy3 + self.stack.at(7);
        let dx5 = dx4 + self.stack.at(8);
        let dy5 = dy4 + self.stack.at(9);
        self.x = dx5 + self.stack.at(10);
        self.y = dy5 + self.stack.at(11);
        let mut builder = Builder { sink };
        builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
        builder.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_flex1<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dy1 dx2 dy2 dx3 dy3 dx4 dy4 dx5 dy5 d6

        if self.stack.len() != 11 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let dx1 = self.x + self.stack.at(0);
        let dy1 = self.y + self.stack.at(1);
        let dx2 = dx1 + self.stack.at(2);
        let dy2 = dy1 + self.stack.at(3);
        let dx3 = dx2 + self.stack.at(4);
        let dy3 = dy2 + self.stack.at(5);
        let dx4 = dx3 + self.stack.at(6);
        let dy4 = dy3 + self.stack.at(7);
        let dx5 = dx4 + self.stack.at(8);
        let dy5 = dy4 + self.stack.at(9);

        if (dx5 - self.x).abs() > (dy5 - self.y).abs() {
            self.x = dx5 + self.stack.at(10);
        } else {
            self.y = dy5 + self.stack.at(10);
        }

        let mut builder = Builder { sink };
        builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
        builder.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_hflex<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dx2 dy2 dx3 dx4 dx5 dx6

        if self.stack.len() != 7 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let dx1 = self.x + self.stack.at(0);
        let dy1 = self.y;
        let dx2 = dx1 + self.stack.at(1);
        let dy2 = dy1 + self.stack.at(2);
        let dx3 = dx2 + self.stack.at(3);
        let dy3 = dy2;
        let dx4 = dx3 + self.stack.at(4);
        let dy4 = dy2;
        let dx5 = dx4 + self.stack.at(5);
        let dy5 = self.y;
        self.x = dx5 + self.stack.at(6);
        let mut builder = Builder { sink };
        builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
        builder.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    pub fn parse_hflex1<S: OutlineSink>(
        &mut self,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        // dx1 dy1 dx2 dy2 dx3 dx4 dx5 dy5 dx6

        if self.stack.len() != 9 {
            return Err(CFFError::InvalidArgumentsStackLength);
        }

        let dx1 = self.x + self.stack.at(0);
        let dy1 = self.y + self.stack.at(1);
        let dx2 = dx1 + self.stack.at(2);
        let dy2 = dy1 + self.stack.at(3);
        let dx3 = dx2 + self.stack.at(4);
        let dy3 = dy2;
        let dx4 = dx3 + self.stack.at(5);
        let dy4 = dy2;
        let dx5 = dx4 + self.stack.at(6);
        let dy5 = dy4 + self.stack.at(7);
        self.x = dx5 + self.stack.at(8);
        let mut builder = Builder { sink };
        builder.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
        builder.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);

        self.stack.clear();
        Ok(())
    }

    /// Close the open contour, if any. Used by `endchar` and at the end of a glyph.
    pub fn close_path<S: OutlineSink>(&mut self, sink: &mut ScaledSink<'_, S>) {
        Builder { sink }.close();
    }
}

//! Glyph outline generation for CFF.
//!
//! Decoded charstring [Instruction]s are evaluated on a small stack machine that drives an
//! [OutlineSink]. Subroutine calls are inlined when charstrings are decoded so evaluation is a
//! single linear pass over the instruction list.

// Portions of this file derived from ttf-parser, licenced under Apache-2.0.
// https://github.com/RazrFalcon/ttf-parser/tree/439aaaebd50eb8aed66302e3c1b51fae047f85b2

use log::debug;

use crate::outline::{OutlineSink, ScaledSink};

use super::charstring::{ArgumentsStack, Instruction, Type2Op};
use super::compact::{load_values, merged_values};
use super::CFFError;

mod charstring;

/// Evaluates charstring instructions into outlines.
///
/// Evaluation stacks are pooled so evaluating many glyphs does not reallocate. An `Evaluator`
/// can be reused for any number of glyphs but is not meant to be shared between threads.
#[derive(Debug, Default)]
pub struct Evaluator {
    pool: Vec<EvaluationStack>,
}

/// Pen position and operand stack for one evaluation.
#[derive(Debug, Clone, Default)]
pub(crate) struct EvaluationStack {
    pub x: f32,
    pub y: f32,
    pub stack: ArgumentsStack,
}

/// What to do after an instruction has been evaluated.
enum Step {
    Continue,
    Stop,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    /// Evaluate `instructions` into `sink` with all coordinates multiplied by `scale`.
    ///
    /// The instructions may be compacted. The glyph is wrapped in `begin_contour_set` and
    /// `end_contour_set`, and a contour left open at the end is closed.
    pub fn evaluate<S: OutlineSink>(
        &mut self,
        instructions: &[Instruction],
        sink: &mut S,
        scale: f32,
    ) -> Result<(), CFFError> {
        let mut sink = ScaledSink::new(sink, scale);
        sink.begin_contour_set(None);

        let mut frame = self.acquire();
        let result = frame.run(instructions, &mut sink);
        self.release(frame);
        result?;

        if sink.is_contour_open() {
            sink.close_contour();
        }
        sink.end_contour_set();
        Ok(())
    }

    /// Evaluate `instructions` into `sink` in font units.
    pub fn evaluate_unscaled<S: OutlineSink>(
        &mut self,
        instructions: &[Instruction],
        sink: &mut S,
    ) -> Result<(), CFFError> {
        self.evaluate(instructions, sink, 1.0)
    }

    fn acquire(&mut self) -> EvaluationStack {
        self.pool.pop().unwrap_or_default()
    }

    fn release(&mut self, mut frame: EvaluationStack) {
        frame.reset();
        self.pool.push(frame);
    }
}

impl EvaluationStack {
    fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.stack.clear();
    }

    fn run<S: OutlineSink>(
        &mut self,
        instructions: &[Instruction],
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<(), CFFError> {
        for inst in instructions {
            for value in merged_values(inst.merged, inst.value) {
                self.push_int(value)?;
            }
            match self.evaluate(*inst, sink)? {
                Step::Continue => {}
                Step::Stop => break,
            }
        }
        Ok(())
    }

    fn push_int(&mut self, value: i32) -> Result<(), CFFError> {
        self.stack.push(value as f32)
    }

    fn evaluate<S: OutlineSink>(
        &mut self,
        inst: Instruction,
        sink: &mut ScaledSink<'_, S>,
    ) -> Result<Step, CFFError> {
        match inst.op {
            Type2Op::LoadInt => self.push_int(inst.value)?,
            Type2Op::LoadFloat => self.stack.push(inst.fixed_value())?,
            Type2Op::LoadShort2 | Type2Op::LoadSbyte4 | Type2Op::LoadSbyte3 => {
                for value in load_values(inst.op, inst.value) {
                    self.push_int(value)?;
                }
            }
            // The width is read from the instruction list by the font, not evaluated.
            Type2Op::GlyphWidth => {}

            // Hints do not affect the outline.
            Type2Op::HStem
            | Type2Op::VStem
            | Type2Op::HStemHm
            | Type2Op::VStemHm
            | Type2Op::HintMask1
            | Type2Op::HintMask2
            | Type2Op::HintMask3
            | Type2Op::HintMask4
            | Type2Op::HintMaskBits
            | Type2Op::CntrMask1
            | Type2Op::CntrMask2
            | Type2Op::CntrMask3
            | Type2Op::CntrMask4
            | Type2Op::CntrMaskBits => self.stack.clear(),

            Type2Op::RMoveTo => self.parse_move_to(sink)?,
            Type2Op::HMoveTo => self.parse_horizontal_move_to(sink)?,
            Type2Op::VMoveTo => self.parse_vertical_move_to(sink)?,
            Type2Op::RLineTo => self.parse_line_to(sink)?,
            Type2Op::HLineTo => self.parse_horizontal_line_to(sink)?,
            Type2Op::VLineTo => self.parse_vertical_line_to(sink)?,
            Type2Op::RRCurveTo => self.parse_curve_to(sink)?,
            Type2Op::HHCurveTo => self.parse_hh_curve_to(sink)?,
            Type2Op::HVCurveTo => self.parse_hv_curve_to(sink)?,
            Type2Op::RCurveLine => self.parse_curve_line(sink)?,
            Type2Op::RLineCurve => self.parse_line_curve(sink)?,
            Type2Op::VHCurveTo => self.parse_vh_curve_to(sink)?,
            Type2Op::VVCurveTo => self.parse_vv_curve_to(sink)?,
            Type2Op::Flex => self.parse_flex(sink)?,
            Type2Op::HFlex => self.parse_hflex(sink)?,
            Type2Op::HFlex1 => self.parse_hflex1(sink)?,
            Type2Op::Flex1 => self.parse_flex1(sink)?,

            Type2Op::EndChar => {
                self.close_path(sink);
                self.stack.clear();
                return Ok(Step::Stop);
            }
            Type2Op::Return => {
                self.stack.clear();
                return Ok(Step::Stop);
            }
            Type2Op::CallSubr | Type2Op::CallGSubr => {
                return Err(CFFError::UnexpectedSubroutineCall)
            }

            Type2Op::And
            | Type2Op::Or
            | Type2Op::Not
            | Type2Op::Abs
            | Type2Op::Add
            | Type2Op::Sub
            | Type2Op::Div
            | Type2Op::Neg
            | Type2Op::Eq
            | Type2Op::Drop
            | Type2Op::Put
            | Type2Op::Get
            | Type2Op::IfElse
            | Type2Op::Random
            | Type2Op::Mul
            | Type2Op::Sqrt
            | Type2Op::Dup
            | Type2Op::Exch
            | Type2Op::Index
            | Type2Op::Roll => {
                debug!("charstring operator {} is not evaluated", inst.op);
            }
        }

        Ok(Step::Continue)
    }
}

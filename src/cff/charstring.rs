//! Type 2 charstring decoding.
//!
//! Refer to [Technical Note #5177](https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf)
//! for more information.
//!
//! A charstring is decoded into a flat list of [Instruction]s. Operands become load
//! instructions, subroutine calls are inlined, the glyph width (if present) becomes a
//! [Type2Op::GlyphWidth] instruction and the mask bytes following `hintmask`/`cntrmask` are
//! folded into the mask instruction.

use std::fmt;

use log::debug;

use crate::binary::read::{ReadCtxt, ReadScope};
use crate::binary::U8;

use super::{CFFError, Index};

mod argstack;

pub use argstack::ArgumentsStack;

// Limits according to the Adobe Technical Note #5177 Appendix B.
pub(crate) const STACK_LIMIT: u8 = 10;
pub(crate) const MAX_ARGUMENTS_STACK_LEN: usize = 48;

pub(crate) const TWO_BYTE_OPERATOR_MARK: u8 = 12;

/// The operation performed by an [Instruction].
///
/// Besides the Type 2 operators this includes the load instructions that push operands and
/// the marker for the glyph width.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Type2Op {
    /// Push `value`.
    LoadInt,
    /// Push `value` interpreted as a 16.16 fixed point number.
    LoadFloat,
    /// Push the two 16-bit halves of `value`, high half first.
    LoadShort2,
    /// Push the four signed bytes of `value`, most significant first.
    LoadSbyte4,
    /// Push the three most significant signed bytes of `value`.
    LoadSbyte3,
    /// The advance width of the glyph relative to nominalWidthX.
    GlyphWidth,

    HStem,
    VStem,
    VStemHm,
    HStemHm,

    /// `hintmask` with 1 to 4 mask bytes packed into `value`, first byte most significant.
    HintMask1,
    HintMask2,
    HintMask3,
    HintMask4,
    /// `hintmask` with more than 4 mask bytes. The bytes are in the preceding `LoadInt`
    /// instructions and `value` is the number of bytes.
    HintMaskBits,
    CntrMask1,
    CntrMask2,
    CntrMask3,
    CntrMask4,
    CntrMaskBits,

    RMoveTo,
    HMoveTo,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RRCurveTo,
    HHCurveTo,
    HVCurveTo,
    RCurveLine,
    RLineCurve,
    VHCurveTo,
    VVCurveTo,

    Flex,
    HFlex,
    HFlex1,
    Flex1,

    EndChar,
    Return,
    CallSubr,
    CallGSubr,

    And,
    Or,
    Not,
    Abs,
    Add,
    Sub,
    Div,
    Neg,
    Eq,
    Drop,
    Put,
    Get,
    IfElse,
    Random,
    Mul,
    Sqrt,
    Dup,
    Exch,
    Index,
    Roll,
}

/// How the operands of a load were folded into another instruction by compaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Merged {
    None,
    /// `value` is pushed before the operation.
    Int,
    /// The two 16-bit halves of `value` are pushed before the operation.
    Short2,
    /// The four signed bytes of `value` are pushed before the operation.
    Sbyte4,
}

/// A single decoded charstring instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub op: Type2Op,
    pub merged: Merged,
    pub value: i32,
}

/// A local or global subroutine INDEX along with its bias.
#[derive(Copy, Clone)]
pub struct Subroutines<'i, 'a> {
    index: &'i Index<'a>,
    bias: i32,
}

/// Decodes charstrings into [Instruction] lists, inlining subroutine calls.
pub struct CharStringDecoder<'i, 'a> {
    global_subrs: Subroutines<'i, 'a>,
    local_subrs: Option<Subroutines<'i, 'a>>,
}

/// Per-charstring decoding state.
struct ParseContext {
    insts: Vec<Instruction>,
    hint_stem_count: usize,
    found_some_stem: bool,
    entered_path: bool,
    // Operands pushed since the last stem operator, counted only until the first other operator
    current_integer_count: usize,
    // Operands pushed since the last operator
    pending_operands: usize,
    do_stem_count: bool,
    latest_stem_op: Option<Type2Op>,
}

enum Flow {
    Continue,
    Return,
    EndChar,
}

impl Instruction {
    pub fn load_int(value: i32) -> Self {
        Instruction {
            op: Type2Op::LoadInt,
            merged: Merged::None,
            value,
        }
    }

    pub fn op(op: Type2Op) -> Self {
        Instruction::with_value(op, 0)
    }

    pub fn with_value(op: Type2Op, value: i32) -> Self {
        Instruction {
            op,
            merged: Merged::None,
            value,
        }
    }

    pub fn is_load_int(&self) -> bool {
        self.op == Type2Op::LoadInt && self.merged == Merged::None
    }

    /// The value of a [Type2Op::LoadFloat] instruction.
    pub fn fixed_value(&self) -> f32 {
        self.value as f32 / 65536.0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.merged {
            Merged::None => {}
            Merged::Int => write!(f, "[{}] ", self.value)?,
            Merged::Short2 => write!(f, "[{} {}] ", self.value >> 16, self.value as i16)?,
            Merged::Sbyte4 => write!(
                f,
                "[{} {} {} {}] ",
                (self.value >> 24) as i8,
                (self.value >> 16) as i8,
                (self.value >> 8) as i8,
                self.value as i8
            )?,
        }
        match self.op {
            Type2Op::LoadInt => write!(f, "{}", self.value),
            Type2Op::LoadFloat => write!(f, "{}", self.fixed_value()),
            Type2Op::GlyphWidth => write!(f, "width {}", self.value),
            op if self.merged == Merged::None && self.value != 0 => {
                write!(f, "{} {:#x}", op, self.value)
            }
            op => write!(f, "{}", op),
        }
    }
}

impl Type2Op {
    pub fn name(self) -> &'static str {
        match self {
            Type2Op::LoadInt => "load_int",
            Type2Op::LoadFloat => "load_float",
            Type2Op::LoadShort2 => "load_short2",
            Type2Op::LoadSbyte4 => "load_sbyte4",
            Type2Op::LoadSbyte3 => "load_sbyte3",
            Type2Op::GlyphWidth => "width",
            Type2Op::HStem => "hstem",
            Type2Op::VStem => "vstem",
            Type2Op::VStemHm => "vstemhm",
            Type2Op::HStemHm => "hstemhm",
            Type2Op::HintMask1
            | Type2Op::HintMask2
            | Type2Op::HintMask3
            | Type2Op::HintMask4
            | Type2Op::HintMaskBits => "hintmask",
            Type2Op::CntrMask1
            | Type2Op::CntrMask2
            | Type2Op::CntrMask3
            | Type2Op::CntrMask4
            | Type2Op::CntrMaskBits => "cntrmask",
            Type2Op::RMoveTo => "rmoveto",
            Type2Op::HMoveTo => "hmoveto",
            Type2Op::VMoveTo => "vmoveto",
            Type2Op::RLineTo => "rlineto",
            Type2Op::HLineTo => "hlineto",
            Type2Op::VLineTo => "vlineto",
            Type2Op::RRCurveTo => "rrcurveto",
            Type2Op::HHCurveTo => "hhcurveto",
            Type2Op::HVCurveTo => "hvcurveto",
            Type2Op::RCurveLine => "rcurveline",
            Type2Op::RLineCurve => "rlinecurve",
            Type2Op::VHCurveTo => "vhcurveto",
            Type2Op::VVCurveTo => "vvcurveto",
            Type2Op::Flex => "flex",
            Type2Op::HFlex => "hflex",
            Type2Op::HFlex1 => "hflex1",
            Type2Op::Flex1 => "flex1",
            Type2Op::EndChar => "endchar",
            Type2Op::Return => "return",
            Type2Op::CallSubr => "callsubr",
            Type2Op::CallGSubr => "callgsubr",
            Type2Op::And => "and",
            Type2Op::Or => "or",
            Type2Op::Not => "not",
            Type2Op::Abs => "abs",
            Type2Op::Add => "add",
            Type2Op::Sub => "sub",
            Type2Op::Div => "div",
            Type2Op::Neg => "neg",
            Type2Op::Eq => "eq",
            Type2Op::Drop => "drop",
            Type2Op::Put => "put",
            Type2Op::Get => "get",
            Type2Op::IfElse => "ifelse",
            Type2Op::Random => "random",
            Type2Op::Mul => "mul",
            Type2Op::Sqrt => "sqrt",
            Type2Op::Dup => "dup",
            Type2Op::Exch => "exch",
            Type2Op::Index => "index",
            Type2Op::Roll => "roll",
        }
    }

    /// Returns true for instructions that only push operands.
    pub fn is_load(self) -> bool {
        matches!(
            self,
            Type2Op::LoadInt
                | Type2Op::LoadFloat
                | Type2Op::LoadShort2
                | Type2Op::LoadSbyte4
                | Type2Op::LoadSbyte3
        )
    }

    /// Returns true for `hintmask` and `cntrmask` instructions.
    pub fn is_mask(self) -> bool {
        matches!(
            self,
            Type2Op::HintMask1
                | Type2Op::HintMask2
                | Type2Op::HintMask3
                | Type2Op::HintMask4
                | Type2Op::HintMaskBits
                | Type2Op::CntrMask1
                | Type2Op::CntrMask2
                | Type2Op::CntrMask3
                | Type2Op::CntrMask4
                | Type2Op::CntrMaskBits
        )
    }

    /// Maps the second byte of a two byte operator.
    fn from_escaped(op2: u8) -> Option<Type2Op> {
        let op = match op2 {
            operator::AND => Type2Op::And,
            operator::OR => Type2Op::Or,
            operator::NOT => Type2Op::Not,
            operator::ABS => Type2Op::Abs,
            operator::ADD => Type2Op::Add,
            operator::SUB => Type2Op::Sub,
            operator::DIV => Type2Op::Div,
            operator::NEG => Type2Op::Neg,
            operator::EQ => Type2Op::Eq,
            operator::DROP => Type2Op::Drop,
            operator::PUT => Type2Op::Put,
            operator::GET => Type2Op::Get,
            operator::IF_ELSE => Type2Op::IfElse,
            operator::RANDOM => Type2Op::Random,
            operator::MUL => Type2Op::Mul,
            operator::SQRT => Type2Op::Sqrt,
            operator::DUP => Type2Op::Dup,
            operator::EXCH => Type2Op::Exch,
            operator::INDEX => Type2Op::Index,
            operator::ROLL => Type2Op::Roll,
            operator::HFLEX => Type2Op::HFlex,
            operator::FLEX => Type2Op::Flex,
            operator::HFLEX1 => Type2Op::HFlex1,
            operator::FLEX1 => Type2Op::Flex1,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Type2Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'i, 'a> Subroutines<'i, 'a> {
    pub fn new(index: &'i Index<'a>) -> Self {
        Subroutines {
            index,
            bias: i32::from(calc_subroutine_bias(index.len())),
        }
    }

    pub fn bias(&self) -> i32 {
        self.bias
    }

    /// Returns the charstring of the subroutine selected by the biased `operand`.
    pub fn get(&self, operand: i32) -> Result<&'a [u8], CFFError> {
        let index = conv_subroutine_index(operand, self.bias)?;
        self.index
            .read_object(index)
            .ok_or(CFFError::InvalidSubroutineIndex)
    }
}

impl<'i, 'a> CharStringDecoder<'i, 'a> {
    pub fn new(
        global_subrs: Subroutines<'i, 'a>,
        local_subrs: Option<Subroutines<'i, 'a>>,
    ) -> Self {
        CharStringDecoder {
            global_subrs,
            local_subrs,
        }
    }

    /// Decode a glyph's charstring into a list of instructions.
    pub fn decode(&self, char_string: &[u8]) -> Result<Vec<Instruction>, CFFError> {
        let mut ctx = ParseContext::new();
        self.decode_buffer(&mut ctx, char_string, 0)?;
        Ok(ctx.insts)
    }

    fn decode_buffer(
        &self,
        ctx: &mut ParseContext,
        char_string: &[u8],
        depth: u8,
    ) -> Result<Flow, CFFError> {
        let mut s = ReadScope::new(char_string).ctxt();
        while s.bytes_available() {
            let op = s.read::<U8>()?;
            match op {
                32..=246 => ctx.push_int(parse_int1(op)),
                247..=250 => ctx.push_int(parse_int2(op, &mut s)?),
                251..=254 => ctx.push_int(parse_int3(op, &mut s)?),
                operator::SHORT_INT => ctx.push_int(i32::from(s.read_i16be()?)),
                operator::FIXED_16_16 => {
                    let value = s.read_i32be()?;
                    ctx.push_operand(Instruction::with_value(Type2Op::LoadFloat, value));
                }
                0 | 2 | 9 | 13 | 15 | 16 | 17 => {
                    debug!("skipping reserved charstring operator {}", op);
                }
                TWO_BYTE_OPERATOR_MARK => {
                    let op2 = s.read::<U8>()?;
                    match Type2Op::from_escaped(op2) {
                        Some(
                            op @ (Type2Op::Flex | Type2Op::Flex1 | Type2Op::HFlex | Type2Op::HFlex1),
                        ) => ctx.add_path_op(op),
                        Some(op) => ctx.insts.push(Instruction::op(op)),
                        None if op2 <= 38 => return Err(CFFError::InvalidOperator),
                        None => debug!("skipping unknown charstring operator 12 {}", op2),
                    }
                    ctx.stop_stem_count();
                }
                operator::ENDCHAR => {
                    ctx.add_end_char()?;
                    return Ok(Flow::EndChar);
                }
                operator::MOVE_TO => ctx.add_move_to(Type2Op::RMoveTo)?,
                operator::HORIZONTAL_MOVE_TO => ctx.add_move_to(Type2Op::HMoveTo)?,
                operator::VERTICAL_MOVE_TO => ctx.add_move_to(Type2Op::VMoveTo)?,
                operator::LINE_TO => ctx.add_path_op(Type2Op::RLineTo),
                operator::HORIZONTAL_LINE_TO => ctx.add_path_op(Type2Op::HLineTo),
                operator::VERTICAL_LINE_TO => ctx.add_path_op(Type2Op::VLineTo),
                operator::CURVE_TO => ctx.add_path_op(Type2Op::RRCurveTo),
                operator::HH_CURVE_TO => ctx.add_path_op(Type2Op::HHCurveTo),
                operator::HV_CURVE_TO => ctx.add_path_op(Type2Op::HVCurveTo),
                operator::CURVE_LINE => ctx.add_path_op(Type2Op::RCurveLine),
                operator::LINE_CURVE => ctx.add_path_op(Type2Op::RLineCurve),
                operator::VH_CURVE_TO => ctx.add_path_op(Type2Op::VHCurveTo),
                operator::VV_CURVE_TO => ctx.add_path_op(Type2Op::VVCurveTo),
                operator::HORIZONTAL_STEM => ctx.add_stem(Type2Op::HStem)?,
                operator::VERTICAL_STEM => ctx.add_stem(Type2Op::VStem)?,
                operator::VERTICAL_STEM_HINT_MASK => ctx.add_stem(Type2Op::VStemHm)?,
                operator::HORIZONTAL_STEM_HINT_MASK => ctx.add_stem(Type2Op::HStemHm)?,
                operator::HINT_MASK => {
                    ctx.add_hint_mask(&mut s)?;
                    ctx.stop_stem_count();
                }
                operator::COUNTER_MASK => {
                    ctx.add_counter_mask(&mut s)?;
                    ctx.stop_stem_count();
                }
                operator::RETURN => {
                    if depth == 0 {
                        ctx.insts.push(Instruction::op(Type2Op::Return));
                    }
                    return Ok(Flow::Return);
                }
                operator::CALL_LOCAL_SUBROUTINE => {
                    let operand = ctx.pop_subroutine_operand()?;
                    let subrs = self.local_subrs.ok_or(CFFError::NoLocalSubroutines)?;
                    if self.call_subroutine(ctx, subrs, operand, depth)? {
                        return Ok(Flow::EndChar);
                    }
                }
                operator::CALL_GLOBAL_SUBROUTINE => {
                    let operand = ctx.pop_subroutine_operand()?;
                    if self.call_subroutine(ctx, self.global_subrs, operand, depth)? {
                        return Ok(Flow::EndChar);
                    }
                }
            }
        }

        Ok(Flow::Continue)
    }

    /// Inline the subroutine selected by `operand`. Returns true if it ended the charstring.
    fn call_subroutine(
        &self,
        ctx: &mut ParseContext,
        subrs: Subroutines<'i, 'a>,
        operand: i32,
        depth: u8,
    ) -> Result<bool, CFFError> {
        if depth + 1 >= STACK_LIMIT {
            return Err(CFFError::NestingLimitReached);
        }

        let char_string = subrs.get(operand)?;
        match self.decode_buffer(ctx, char_string, depth + 1)? {
            Flow::EndChar => Ok(true),
            Flow::Continue | Flow::Return => Ok(false),
        }
    }
}

impl ParseContext {
    fn new() -> Self {
        ParseContext {
            insts: Vec::new(),
            hint_stem_count: 0,
            found_some_stem: false,
            entered_path: false,
            current_integer_count: 0,
            pending_operands: 0,
            do_stem_count: true,
            latest_stem_op: None,
        }
    }

    fn push_int(&mut self, value: i32) {
        self.push_operand(Instruction::load_int(value));
    }

    fn push_operand(&mut self, inst: Instruction) {
        self.insts.push(inst);
        self.pending_operands += 1;
        if self.do_stem_count {
            self.current_integer_count += 1;
        }
    }

    /// Called after every operator. Operands pushed before it no longer count as stems.
    fn stop_stem_count(&mut self) {
        self.do_stem_count = false;
        self.current_integer_count = 0;
        self.pending_operands = 0;
    }

    fn add_path_op(&mut self, op: Type2Op) {
        self.entered_path = true;
        self.insts.push(Instruction::op(op));
        self.stop_stem_count();
    }

    /// Turn the first pending operand into the glyph width.
    fn take_width(&mut self) -> Result<(), CFFError> {
        let index = self
            .insts
            .len()
            .checked_sub(self.pending_operands)
            .ok_or(CFFError::InvalidWidth)?;
        match self.insts.get_mut(index) {
            Some(first) if first.is_load_int() => {
                *first = Instruction::with_value(Type2Op::GlyphWidth, first.value);
                Ok(())
            }
            _ => Err(CFFError::InvalidWidth),
        }
    }

    fn width_allowed(&self) -> bool {
        !self.found_some_stem && !self.entered_path
    }

    // The first stack-clearing operator, which must be one of hstem, hstemhm, vstem, vstemhm,
    // cntrmask, hintmask, hmoveto, vmoveto, rmoveto, or endchar, takes an additional argument:
    // the width.
    fn add_end_char(&mut self) -> Result<(), CFFError> {
        if self.width_allowed() && self.pending_operands % 2 == 1 {
            self.take_width()?;
        }
        self.insts.push(Instruction::op(Type2Op::EndChar));
        self.stop_stem_count();
        Ok(())
    }

    fn add_move_to(&mut self, op: Type2Op) -> Result<(), CFFError> {
        if self.width_allowed() {
            let has_width = match op {
                Type2Op::RMoveTo => self.pending_operands % 2 == 1,
                _ => self.pending_operands > 1,
            };
            if has_width {
                self.take_width()?;
            }
        }
        self.entered_path = true;
        self.insts.push(Instruction::op(op));
        self.stop_stem_count();
        Ok(())
    }

    fn add_stem(&mut self, op: Type2Op) -> Result<(), CFFError> {
        // Stems always come in pairs so an odd count means the first operand is the width.
        if self.current_integer_count % 2 == 1 {
            if self.found_some_stem {
                return Err(CFFError::InvalidArgumentsStackLength);
            }
            self.take_width()?;
            self.current_integer_count -= 1;
        }
        self.hint_stem_count += self.current_integer_count / 2;
        self.insts.push(Instruction::op(op));
        self.current_integer_count = 0;
        self.pending_operands = 0;
        self.found_some_stem = true;
        self.latest_stem_op = Some(op);
        Ok(())
    }

    fn add_hint_mask(&mut self, s: &mut ReadCtxt<'_>) -> Result<(), CFFError> {
        // If hstem and vstem hints are both declared at the beginning of a charstring, and this
        // sequence is followed directly by the hintmask or cntrmask operators, the vstem hint
        // operator need not be included.
        if self.found_some_stem && self.do_stem_count {
            if let Some(Type2Op::HStem | Type2Op::HStemHm | Type2Op::VStemHm) =
                self.latest_stem_op
            {
                self.hint_stem_count += self.current_integer_count / 2;
                self.insts.push(Instruction::op(Type2Op::VStem));
                self.latest_stem_op = Some(Type2Op::VStem);
                self.current_integer_count = 0;
            }
        }

        if self.hint_stem_count == 0 {
            if self.found_some_stem {
                return Err(CFFError::InvalidArgumentsStackLength);
            }
            if self.current_integer_count % 2 == 1 && !self.entered_path {
                self.take_width()?;
                self.current_integer_count -= 1;
            }
            self.hint_stem_count = self.current_integer_count / 2;
            if self.hint_stem_count == 0 {
                return Ok(());
            }
            self.found_some_stem = true;
        }

        self.add_mask_bytes(s, MaskKind::Hint)
    }

    fn add_counter_mask(&mut self, s: &mut ReadCtxt<'_>) -> Result<(), CFFError> {
        if self.hint_stem_count == 0 {
            if self.found_some_stem {
                return Err(CFFError::InvalidArgumentsStackLength);
            }
            self.hint_stem_count = self.current_integer_count / 2;
            self.found_some_stem = true;
        } else {
            self.hint_stem_count += self.current_integer_count / 2;
        }

        self.add_mask_bytes(s, MaskKind::Counter)
    }

    fn add_mask_bytes(&mut self, s: &mut ReadCtxt<'_>, kind: MaskKind) -> Result<(), CFFError> {
        let nbytes = (self.hint_stem_count + 7) / 8;
        if nbytes == 0 {
            return Ok(());
        }
        let mask = s
            .read_slice(nbytes)
            .map_err(|_| CFFError::HintMaskOverrun)?;

        if nbytes <= 4 {
            let op = match (kind, nbytes) {
                (MaskKind::Hint, 1) => Type2Op::HintMask1,
                (MaskKind::Hint, 2) => Type2Op::HintMask2,
                (MaskKind::Hint, 3) => Type2Op::HintMask3,
                (MaskKind::Hint, _) => Type2Op::HintMask4,
                (MaskKind::Counter, 1) => Type2Op::CntrMask1,
                (MaskKind::Counter, 2) => Type2Op::CntrMask2,
                (MaskKind::Counter, 3) => Type2Op::CntrMask3,
                (MaskKind::Counter, _) => Type2Op::CntrMask4,
            };
            self.insts
                .push(Instruction::with_value(op, pack_mask_bytes(mask)));
        } else {
            for chunk in mask.chunks(4) {
                self.insts
                    .push(Instruction::load_int(pack_mask_bytes(chunk)));
            }
            let op = match kind {
                MaskKind::Hint => Type2Op::HintMaskBits,
                MaskKind::Counter => Type2Op::CntrMaskBits,
            };
            let nbytes = i32::try_from(nbytes).map_err(|_| CFFError::HintMaskOverrun)?;
            self.insts.push(Instruction::with_value(op, nbytes));
        }

        Ok(())
    }

    fn pop_subroutine_operand(&mut self) -> Result<i32, CFFError> {
        match self.insts.pop() {
            Some(inst) if inst.is_load_int() => {
                self.pending_operands = self.pending_operands.saturating_sub(1);
                if self.do_stem_count {
                    self.current_integer_count = self.current_integer_count.saturating_sub(1);
                }
                Ok(inst.value)
            }
            _ => Err(CFFError::InvalidSubroutineCall),
        }
    }
}

#[derive(Copy, Clone)]
enum MaskKind {
    Hint,
    Counter,
}

/// Packs up to 4 mask bytes into an i32, the first byte in the most significant position.
fn pack_mask_bytes(bytes: &[u8]) -> i32 {
    let mut buf = [0; 4];
    buf[..bytes.len()].copy_from_slice(bytes);
    i32::from_be_bytes(buf)
}

// CharString number parsing functions
fn parse_int1(op: u8) -> i32 {
    i32::from(op) - 139
}

fn parse_int2(op: u8, s: &mut ReadCtxt<'_>) -> Result<i32, CFFError> {
    let b1 = s.read::<U8>()?;
    let n = (i32::from(op) - 247) * 256 + i32::from(b1) + 108;
    debug_assert!((108..=1131).contains(&n));
    Ok(n)
}

fn parse_int3(op: u8, s: &mut ReadCtxt<'_>) -> Result<i32, CFFError> {
    let b1 = s.read::<U8>()?;
    let n = -(i32::from(op) - 251) * 256 - i32::from(b1) - 108;
    debug_assert!((-1131..=-108).contains(&n));
    Ok(n)
}

// Conversions from biased subr index operands to unbiased value
pub(crate) fn conv_subroutine_index(index: i32, bias: i32) -> Result<usize, CFFError> {
    index
        .checked_add(bias)
        .and_then(|index| usize::try_from(index).ok())
        .ok_or(CFFError::InvalidSubroutineIndex)
}

// Adobe Technical Note #5176, Chapter 16 "Local / Global Subrs INDEXes"
pub fn calc_subroutine_bias(len: usize) -> u16 {
    if len < 1240 {
        107
    } else if len < 33900 {
        1131
    } else {
        32768
    }
}

/// Operators defined in Adobe Technical Note #5177, The Type  2 Charstring Format.
pub(crate) mod operator {
    pub const HORIZONTAL_STEM: u8 = 1;
    pub const VERTICAL_STEM: u8 = 3;
    pub const VERTICAL_MOVE_TO: u8 = 4;
    pub const LINE_TO: u8 = 5;
    pub const HORIZONTAL_LINE_TO: u8 = 6;
    pub const VERTICAL_LINE_TO: u8 = 7;
    pub const CURVE_TO: u8 = 8;
    pub const CALL_LOCAL_SUBROUTINE: u8 = 10;
    pub const RETURN: u8 = 11;
    pub const ENDCHAR: u8 = 14;
    pub const HORIZONTAL_STEM_HINT_MASK: u8 = 18;
    pub const HINT_MASK: u8 = 19;
    pub const COUNTER_MASK: u8 = 20;
    pub const MOVE_TO: u8 = 21;
    pub const HORIZONTAL_MOVE_TO: u8 = 22;
    pub const VERTICAL_STEM_HINT_MASK: u8 = 23;
    pub const CURVE_LINE: u8 = 24;
    pub const LINE_CURVE: u8 = 25;
    pub const VV_CURVE_TO: u8 = 26;
    pub const HH_CURVE_TO: u8 = 27;
    pub const SHORT_INT: u8 = 28;
    pub const CALL_GLOBAL_SUBROUTINE: u8 = 29;
    pub const VH_CURVE_TO: u8 = 30;
    pub const HV_CURVE_TO: u8 = 31;
    pub const FIXED_16_16: u8 = 255;

    // Two byte operators, preceded by 12
    pub const AND: u8 = 3;
    pub const OR: u8 = 4;
    pub const NOT: u8 = 5;
    pub const ABS: u8 = 9;
    pub const ADD: u8 = 10;
    pub const SUB: u8 = 11;
    pub const DIV: u8 = 12;
    pub const NEG: u8 = 14;
    pub const EQ: u8 = 15;
    pub const DROP: u8 = 18;
    pub const PUT: u8 = 20;
    pub const GET: u8 = 21;
    pub const IF_ELSE: u8 = 22;
    pub const RANDOM: u8 = 23;
    pub const MUL: u8 = 24;
    pub const SQRT: u8 = 26;
    pub const DUP: u8 = 27;
    pub const EXCH: u8 = 28;
    pub const INDEX: u8 = 29;
    pub const ROLL: u8 = 30;
    pub const HFLEX: u8 = 34;
    pub const FLEX: u8 = 35;
    pub const HFLEX1: u8 = 36;
    pub const FLEX1: u8 = 37;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::writer::{self, TtfType};

    fn empty_index() -> Index<'static> {
        ReadScope::new(&[0, 0]).read::<Index<'_>>().unwrap()
    }

    fn decode(char_string: &[u8]) -> Result<Vec<Instruction>, CFFError> {
        let global = empty_index();
        CharStringDecoder::new(Subroutines::new(&global), None).decode(char_string)
    }

    fn ops(insts: &[Instruction]) -> Vec<Type2Op> {
        insts.iter().map(|inst| inst.op).collect()
    }

    fn load(value: i32) -> Instruction {
        Instruction::load_int(value)
    }

    fn op(op: Type2Op) -> Instruction {
        Instruction::op(op)
    }

    fn width(value: i32) -> Instruction {
        Instruction::with_value(Type2Op::GlyphWidth, value)
    }

    // Type 2 operands use the same integer encodings as DICT operands
    fn int(value: i32) -> Vec<u8> {
        writer::convert(&[TtfType::CFFInt(value)])
    }

    #[test]
    fn test_calc_subroutine_bias() {
        assert_eq!(calc_subroutine_bias(0), 107);
        assert_eq!(calc_subroutine_bias(1239), 107);
        assert_eq!(calc_subroutine_bias(1240), 1131);
        assert_eq!(calc_subroutine_bias(33899), 1131);
        assert_eq!(calc_subroutine_bias(33900), 32768);
    }

    #[test]
    fn test_decode_operands() {
        let mut char_string = Vec::new();
        char_string.extend(int(-107));
        char_string.extend(int(1131));
        char_string.extend(int(-1131));
        char_string.extend([operator::SHORT_INT, 0x80, 0x00]);
        char_string.extend([operator::FIXED_16_16, 0x00, 0x01, 0x80, 0x00]);
        char_string.push(operator::CURVE_TO);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            insts,
            vec![
                load(-107),
                load(1131),
                load(-1131),
                load(-32768),
                Instruction::with_value(Type2Op::LoadFloat, 0x18000),
                op(Type2Op::RRCurveTo),
                op(Type2Op::EndChar),
            ]
        );
        assert_eq!(insts[4].fixed_value(), 1.5);
    }

    #[test]
    fn test_decode_stops_at_endchar() {
        let insts = decode(&[operator::ENDCHAR, 0x8b, operator::LINE_TO]).unwrap();
        assert_eq!(insts, vec![op(Type2Op::EndChar)]);
    }

    #[test]
    fn test_decode_skips_reserved_operators() {
        let insts = decode(&[0, 0x8b, 2, 0x8b, 9, operator::LINE_TO]).unwrap();
        assert_eq!(insts, vec![load(0), load(0), op(Type2Op::RLineTo)]);
    }

    #[test]
    fn test_decode_escaped_operators() {
        let insts = decode(&[12, operator::ADD, 12, operator::FLEX1, 12, 60]).unwrap();
        assert_eq!(ops(&insts), vec![Type2Op::Add, Type2Op::Flex1]);

        assert_eq!(decode(&[12, 0]), Err(CFFError::InvalidOperator));
    }

    #[test]
    fn test_width_before_stem() {
        // 50 10 20 hstem endchar
        let mut char_string = Vec::new();
        char_string.extend(int(50));
        char_string.extend(int(10));
        char_string.extend(int(20));
        char_string.push(operator::HORIZONTAL_STEM);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            insts,
            vec![
                width(50),
                load(10),
                load(20),
                op(Type2Op::HStem),
                op(Type2Op::EndChar),
            ]
        );
    }

    #[test]
    fn test_width_before_moveto() {
        // 50 10 20 rmoveto 30 hmoveto endchar
        let mut char_string = Vec::new();
        char_string.extend(int(50));
        char_string.extend(int(10));
        char_string.extend(int(20));
        char_string.push(operator::MOVE_TO);
        char_string.extend(int(30));
        char_string.push(operator::HORIZONTAL_MOVE_TO);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(insts[0], width(50));
        assert_eq!(
            ops(&insts[1..]),
            vec![
                Type2Op::LoadInt,
                Type2Op::LoadInt,
                Type2Op::RMoveTo,
                Type2Op::LoadInt,
                Type2Op::HMoveTo,
                Type2Op::EndChar
            ]
        );
    }

    #[test]
    fn test_width_before_hmoveto() {
        let mut char_string = int(50);
        char_string.extend(int(10));
        char_string.push(operator::HORIZONTAL_MOVE_TO);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(insts, vec![width(50), load(10), op(Type2Op::HMoveTo), op(Type2Op::EndChar)]);
    }

    #[test]
    fn test_no_width() {
        let mut char_string = int(10);
        char_string.extend(int(20));
        char_string.push(operator::MOVE_TO);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(insts[0], load(10));
    }

    #[test]
    fn test_width_only_endchar() {
        let mut char_string = int(250);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(insts, vec![width(250), op(Type2Op::EndChar)]);
    }

    #[test]
    fn test_odd_stem_after_stems() {
        let mut char_string = int(10);
        char_string.extend(int(20));
        char_string.push(operator::HORIZONTAL_STEM);
        char_string.extend(int(30));
        char_string.push(operator::VERTICAL_STEM);

        assert_eq!(
            decode(&char_string),
            Err(CFFError::InvalidArgumentsStackLength)
        );
    }

    #[test]
    fn test_hintmask_synthesizes_vstem() {
        // 5 10 15 20 hstemhm hintmask 0x80 endchar
        let mut char_string = Vec::new();
        for value in [5, 10, 15, 20] {
            char_string.extend(int(value));
        }
        char_string.push(operator::HORIZONTAL_STEM_HINT_MASK);
        char_string.extend([operator::HINT_MASK, 0x80]);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            &insts[4..],
            &[
                op(Type2Op::HStemHm),
                op(Type2Op::VStem),
                Instruction::with_value(Type2Op::HintMask1, 0x8000_0000u32 as i32),
                op(Type2Op::EndChar),
            ]
        );
    }

    #[test]
    fn test_hintmask_implicit_vstem_operands() {
        // 1 2 hstem 3 4 5 6 hintmask (3 stems, 1 byte)
        let mut char_string = Vec::new();
        for value in [1, 2] {
            char_string.extend(int(value));
        }
        char_string.push(operator::HORIZONTAL_STEM);
        for value in [3, 4, 5, 6] {
            char_string.extend(int(value));
        }
        char_string.extend([operator::HINT_MASK, 0xE0]);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            ops(&insts),
            vec![
                Type2Op::LoadInt,
                Type2Op::LoadInt,
                Type2Op::HStem,
                Type2Op::LoadInt,
                Type2Op::LoadInt,
                Type2Op::LoadInt,
                Type2Op::LoadInt,
                Type2Op::VStem,
                Type2Op::HintMask1,
            ]
        );
    }

    #[test]
    fn test_repeated_cntrmask_after_implicit_vstem() {
        // 6 stems from hstem, 2 more from the operands before the first cntrmask
        let mut char_string = Vec::new();
        for _ in 0..12 {
            char_string.extend(int(1));
        }
        char_string.push(operator::HORIZONTAL_STEM);
        for _ in 0..4 {
            char_string.extend(int(1));
        }
        char_string.extend([operator::COUNTER_MASK, 0xFF]);
        char_string.extend([operator::COUNTER_MASK, 0xFF]);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        let mask = Instruction::with_value(Type2Op::CntrMask1, 0xFF00_0000u32 as i32);
        assert_eq!(insts.len(), 12 + 1 + 4 + 3);
        assert_eq!(&insts[17..], &[mask, mask, op(Type2Op::EndChar)]);
    }

    #[test]
    fn test_repeated_hintmask_keeps_stem_count() {
        // 1 2 hstemhm hintmask 0x80 10 20 rmoveto hintmask 0x80 endchar
        let mut char_string = int(1);
        char_string.extend(int(2));
        char_string.push(operator::HORIZONTAL_STEM_HINT_MASK);
        char_string.extend([operator::HINT_MASK, 0x80]);
        char_string.extend(int(10));
        char_string.extend(int(20));
        char_string.push(operator::MOVE_TO);
        char_string.extend([operator::HINT_MASK, 0x80]);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        let mask = Instruction::with_value(Type2Op::HintMask1, 0x8000_0000u32 as i32);
        assert_eq!(
            insts,
            vec![
                load(1),
                load(2),
                op(Type2Op::HStemHm),
                op(Type2Op::VStem),
                mask,
                load(10),
                load(20),
                op(Type2Op::RMoveTo),
                mask,
                op(Type2Op::EndChar),
            ]
        );
    }

    #[test]
    fn test_hintmask_after_moveto_without_stems() {
        // 10 20 rmoveto hintmask endchar
        let mut char_string = int(10);
        char_string.extend(int(20));
        char_string.push(operator::MOVE_TO);
        char_string.push(operator::HINT_MASK);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            insts,
            vec![load(10), load(20), op(Type2Op::RMoveTo), op(Type2Op::EndChar)]
        );
    }

    #[test]
    fn test_endchar_after_path_without_moveto() {
        // 10 20 rlineto endchar
        let mut char_string = int(10);
        char_string.extend(int(20));
        char_string.push(operator::LINE_TO);
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            insts,
            vec![load(10), load(20), op(Type2Op::RLineTo), op(Type2Op::EndChar)]
        );
    }

    #[test]
    fn test_width_after_flex_is_not_taken() {
        // 12 operands and flex enter the path, so the odd endchar operand is not a width
        let mut char_string = Vec::new();
        for _ in 0..13 {
            char_string.extend(int(1));
        }
        char_string.extend([12, operator::FLEX]);
        char_string.extend(int(7));
        char_string.push(operator::ENDCHAR);

        let insts = decode(&char_string).unwrap();
        assert_eq!(insts[insts.len() - 2], load(7));
        assert!(insts.iter().all(|inst| inst.op != Type2Op::GlyphWidth));
    }

    #[test]
    fn test_hintmask_many_stems() {
        // 36 stems declared by hstem need 5 mask bytes
        let mut char_string = Vec::new();
        for _ in 0..72 {
            char_string.extend(int(1));
        }
        char_string.push(operator::HORIZONTAL_STEM);
        char_string.extend([operator::HINT_MASK, 1, 2, 3, 4, 5]);

        let insts = decode(&char_string).unwrap();
        let tail = &insts[insts.len() - 4..];
        assert_eq!(
            tail,
            &[
                op(Type2Op::VStem),
                load(0x01020304),
                load(0x05000000),
                Instruction::with_value(Type2Op::HintMaskBits, 5),
            ]
        );
    }

    #[test]
    fn test_hintmask_overrun() {
        let mut char_string = int(1);
        char_string.extend(int(2));
        char_string.push(operator::HORIZONTAL_STEM);
        char_string.push(operator::HINT_MASK);

        assert_eq!(decode(&char_string), Err(CFFError::HintMaskOverrun));
    }

    #[test]
    fn test_hintmask_without_stems() {
        let insts = decode(&[operator::HINT_MASK, operator::ENDCHAR]).unwrap();
        assert_eq!(insts, vec![op(Type2Op::EndChar)]);
    }

    #[test]
    fn test_cntrmask() {
        let mut char_string = int(1);
        char_string.extend(int(2));
        char_string.push(operator::VERTICAL_STEM);
        char_string.extend([operator::COUNTER_MASK, 0xC0]);

        let insts = decode(&char_string).unwrap();
        assert_eq!(
            insts.last(),
            Some(&Instruction::with_value(Type2Op::CntrMask1, 0xC000_0000u32 as i32))
        );
    }

    #[test]
    fn test_call_global_subroutine() {
        // Global subr 0 is `10 20 rlineto return`
        let subr = [0x95, 0x9f, operator::LINE_TO, operator::RETURN];
        let global_data = writer::index(&[&subr]);
        let global = ReadScope::new(&global_data).read::<Index<'_>>().unwrap();
        let decoder = CharStringDecoder::new(Subroutines::new(&global), None);

        // -107 callgsubr endchar
        let insts = decoder
            .decode(&[32, operator::CALL_GLOBAL_SUBROUTINE, operator::ENDCHAR])
            .unwrap();
        assert_eq!(
            insts,
            vec![load(10), load(20), op(Type2Op::RLineTo), op(Type2Op::EndChar)]
        );
    }

    #[test]
    fn test_endchar_in_subroutine() {
        let subr = [0x8b, operator::HORIZONTAL_MOVE_TO, operator::ENDCHAR];
        let local_data = writer::index(&[&subr]);
        let local = ReadScope::new(&local_data).read::<Index<'_>>().unwrap();
        let global = empty_index();
        let decoder =
            CharStringDecoder::new(Subroutines::new(&global), Some(Subroutines::new(&local)));

        let insts = decoder
            .decode(&[32, operator::CALL_LOCAL_SUBROUTINE, 0x8b, operator::LINE_TO])
            .unwrap();
        assert_eq!(
            insts,
            vec![load(0), op(Type2Op::HMoveTo), op(Type2Op::EndChar)]
        );
    }

    #[test]
    fn test_subroutine_errors() {
        assert_eq!(
            decode(&[32, operator::CALL_LOCAL_SUBROUTINE]),
            Err(CFFError::NoLocalSubroutines)
        );
        assert_eq!(
            decode(&[operator::CALL_GLOBAL_SUBROUTINE]),
            Err(CFFError::InvalidSubroutineCall)
        );
        assert_eq!(
            decode(&[32, operator::CALL_GLOBAL_SUBROUTINE]),
            Err(CFFError::InvalidSubroutineIndex)
        );
    }

    #[test]
    fn test_nesting_limit() {
        // Global subr 0 calls itself
        let subr = [32, operator::CALL_GLOBAL_SUBROUTINE];
        let global_data = writer::index(&[&subr]);
        let global = ReadScope::new(&global_data).read::<Index<'_>>().unwrap();
        let decoder = CharStringDecoder::new(Subroutines::new(&global), None);

        assert_eq!(
            decoder.decode(&[32, operator::CALL_GLOBAL_SUBROUTINE]),
            Err(CFFError::NestingLimitReached)
        );
    }

    #[test]
    fn test_return_at_top_level() {
        let insts = decode(&[operator::RETURN, operator::LINE_TO]).unwrap();
        assert_eq!(insts, vec![op(Type2Op::Return)]);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(load(-5).to_string(), "-5");
        assert_eq!(op(Type2Op::RLineTo).to_string(), "rlineto");
        let merged = Instruction {
            op: Type2Op::RLineTo,
            merged: Merged::Short2,
            value: (10 << 16) | 20,
        };
        assert_eq!(merged.to_string(), "[10 20] rlineto");
    }
}

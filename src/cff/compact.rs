//! Compaction of decoded charstring instructions.
//!
//! Decoded charstrings are dominated by small integer operands. Compaction packs runs of them
//! into wider load instructions and then folds a single remaining load into the operator that
//! follows it. [expand] restores the original instruction list exactly.

use tinyvec::ArrayVec;

use super::charstring::{Instruction, Merged, Type2Op};

/// Which packed load a run of integer operands is being collected for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CompactRange {
    None,
    SByte,
    Short,
}

/// Compacts instruction lists, reusing its buffers between calls.
#[derive(Debug, Default)]
pub struct Compacter {
    step1: Vec<Instruction>,
    pending: ArrayVec<[i32; 4]>,
    pending_range: CompactRange,
}

impl Default for CompactRange {
    fn default() -> Self {
        CompactRange::None
    }
}

impl Compacter {
    pub fn new() -> Self {
        Compacter::default()
    }

    /// Compact `insts`. The result evaluates identically and can be restored with [expand].
    pub fn compact(&mut self, insts: &[Instruction]) -> Vec<Instruction> {
        self.step1.clear();
        self.pending.clear();
        self.pending_range = CompactRange::None;

        self.pack_loads(insts);
        merge_loads(&self.step1)
    }

    // Pass 1: runs of small integer loads become LoadSbyte4/LoadSbyte3/LoadShort2
    fn pack_loads(&mut self, insts: &[Instruction]) {
        for &inst in insts {
            if !inst.is_load_int() {
                self.flush();
                self.step1.push(inst);
                continue;
            }

            let range = compact_range(inst.value);
            if range != self.pending_range {
                self.flush();
            }
            match range {
                CompactRange::None => self.step1.push(inst),
                CompactRange::SByte | CompactRange::Short => {
                    self.pending_range = range;
                    self.pending.push(inst.value);
                    let full = match range {
                        CompactRange::SByte => 4,
                        _ => 2,
                    };
                    if self.pending.len() == full {
                        self.flush();
                    }
                }
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        let inst = match *self.pending.as_slice() {
            [] => None,
            [v0] => Some(Instruction::load_int(v0)),
            [v0, v1] => Some(Instruction::with_value(Type2Op::LoadShort2, pack_short2(v0, v1))),
            [v0, v1, v2] => Some(Instruction::with_value(
                Type2Op::LoadSbyte3,
                pack_sbytes(v0, v1, v2, 0),
            )),
            [v0, v1, v2, v3, ..] => Some(Instruction::with_value(
                Type2Op::LoadSbyte4,
                pack_sbytes(v0, v1, v2, v3),
            )),
        };
        self.step1.extend(inst);
        self.pending.clear();
        self.pending_range = CompactRange::None;
    }
}

// Pass 2: fold a load into the following operator when that operator carries no value.
fn merge_loads(insts: &[Instruction]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(insts.len());
    let mut i = 0;
    while i < insts.len() {
        let inst = insts[i];
        if let Some(next) = insts.get(i + 1) {
            if let Some(merged) = mergeable(inst) {
                if can_absorb(next) {
                    out.push(Instruction {
                        op: next.op,
                        merged,
                        value: inst.value,
                    });
                    i += 2;
                    continue;
                }
            }
        }
        out.push(inst);
        i += 1;
    }
    out
}

fn mergeable(inst: Instruction) -> Option<Merged> {
    if inst.merged != Merged::None {
        return None;
    }
    match inst.op {
        Type2Op::LoadInt => Some(Merged::Int),
        Type2Op::LoadShort2 => Some(Merged::Short2),
        Type2Op::LoadSbyte4 => Some(Merged::Sbyte4),
        _ => None,
    }
}

fn can_absorb(inst: &Instruction) -> bool {
    inst.merged == Merged::None && inst.value == 0 && !inst.op.is_load() && !inst.op.is_mask()
}

/// Restore the instruction list that was passed to [Compacter::compact].
///
/// Lists that were never compacted are returned unchanged.
pub fn expand(insts: &[Instruction]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(insts.len() * 2);
    for inst in insts {
        out.extend(
            merged_values(inst.merged, inst.value)
                .into_iter()
                .map(Instruction::load_int),
        );
        let values = load_values(inst.op, inst.value);
        if values.is_empty() {
            let value = if inst.merged == Merged::None {
                inst.value
            } else {
                0
            };
            out.push(Instruction::with_value(inst.op, value));
        } else {
            out.extend(values.into_iter().map(Instruction::load_int));
        }
    }
    out
}

/// The operands a merged instruction pushes before its operation runs.
pub(crate) fn merged_values(merged: Merged, value: i32) -> ArrayVec<[i32; 4]> {
    let mut values = ArrayVec::new();
    match merged {
        Merged::None => {}
        Merged::Int => values.push(value),
        Merged::Short2 => values.extend(unpack_short2(value)),
        Merged::Sbyte4 => values.extend(unpack_sbytes(value)),
    }
    values
}

/// The operands pushed by a packed load. Empty for other operations.
pub(crate) fn load_values(op: Type2Op, value: i32) -> ArrayVec<[i32; 4]> {
    let mut values = ArrayVec::new();
    match op {
        Type2Op::LoadShort2 => values.extend(unpack_short2(value)),
        Type2Op::LoadSbyte4 => values.extend(unpack_sbytes(value)),
        Type2Op::LoadSbyte3 => values.extend(unpack_sbytes(value).into_iter().take(3)),
        _ => {}
    }
    values
}

fn compact_range(value: i32) -> CompactRange {
    if value > i32::from(i8::MIN) && value < i32::from(i8::MAX) {
        CompactRange::SByte
    } else if value > i32::from(i16::MIN) && value < i32::from(i16::MAX) {
        CompactRange::Short
    } else {
        CompactRange::None
    }
}

fn pack_short2(v0: i32, v1: i32) -> i32 {
    (i32::from(v0 as u16) << 16) | i32::from(v1 as u16)
}

fn unpack_short2(value: i32) -> [i32; 2] {
    [value >> 16, i32::from(value as i16)]
}

fn pack_sbytes(v0: i32, v1: i32, v2: i32, v3: i32) -> i32 {
    i32::from_be_bytes([v0 as u8, v1 as u8, v2 as u8, v3 as u8])
}

fn unpack_sbytes(value: i32) -> [i32; 4] {
    value.to_be_bytes().map(|b| i32::from(b as i8))
}

// This file is derived from ttf-parser, licenced under Apache-2.0.
// https://github.com/RazrFalcon/ttf-parser/blob/439aaaebd50eb8aed66302e3c1b51fae047f85b2/src/tables/cff/argstack.rs

use std::fmt;

use crate::cff::CFFError;

use super::MAX_ARGUMENTS_STACK_LEN;

/// Room above the Type 2 limit so fonts that slightly exceed it still evaluate.
const HEADROOM: usize = 2;
const STORAGE_LEN: usize = MAX_ARGUMENTS_STACK_LEN + HEADROOM;

/// Operand stack used while evaluating charstring instructions.
#[derive(Clone)]
pub struct ArgumentsStack {
    data: [f32; STORAGE_LEN],
    len: usize,
}

impl ArgumentsStack {
    pub fn new() -> Self {
        ArgumentsStack {
            data: [0.0; STORAGE_LEN],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, n: f32) -> Result<(), CFFError> {
        if self.len == STORAGE_LEN {
            Err(CFFError::ArgumentsStackLimitReached)
        } else {
            self.data[self.len] = n;
            self.len += 1;
            Ok(())
        }
    }

    pub fn at(&self, index: usize) -> f32 {
        self.data[index]
    }

    pub fn pop(&mut self) -> f32 {
        debug_assert!(!self.is_empty());
        self.len -= 1;
        self.data[self.len]
    }

    pub fn all(&self) -> &[f32] {
        &self.data[..self.len]
    }

    pub fn reverse(&mut self) {
        // Reverse only the actual data and not the whole stack.
        self.data[..self.len].reverse();
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for ArgumentsStack {
    fn default() -> Self {
        ArgumentsStack::new()
    }
}

impl fmt::Debug for ArgumentsStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.all()).finish()
    }
}

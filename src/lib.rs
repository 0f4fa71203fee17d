#![warn(rust_2018_idioms)]

//! # CFF font program parsing and Type 2 charstring evaluation
//!
//! This crate decodes a CFF (Compact Font Format) table into a [FontSet](cff::FontSet), turning
//! each glyph's Type 2 charstring into a flat list of [Instruction](cff::charstring::Instruction)s
//! with all subroutine calls inlined. The instructions can then be evaluated into path drawing
//! calls on an [OutlineSink](outline::OutlineSink).
//!
//! ### Example
//!
//! ```no_run
//! use cff_outline::binary::read::ReadScope;
//! use cff_outline::cff::outline::Evaluator;
//! use cff_outline::cff::FontSet;
//! # use cff_outline::outline::OutlineSink;
//! # use cff_outline::pathfinder_geometry::line_segment::LineSegment2F;
//! # use cff_outline::pathfinder_geometry::vector::Vector2F;
//! # struct Printer;
//! # impl OutlineSink for Printer {
//! #     fn begin_contour_set(&mut self, _hint: Option<usize>) {}
//! #     fn move_to(&mut self, to: Vector2F) { println!("M {} {}", to.x(), to.y()) }
//! #     fn line_to(&mut self, to: Vector2F) { println!("L {} {}", to.x(), to.y()) }
//! #     fn cubic_curve_to(&mut self, _ctrl: LineSegment2F, to: Vector2F) { println!("C {} {}", to.x(), to.y()) }
//! #     fn close_contour(&mut self) { println!("Z") }
//! #     fn end_contour_set(&mut self) {}
//! # }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = std::fs::read("font.cff")?;
//!     let font_set = FontSet::read(ReadScope::new(&data))?;
//!     let font = &font_set.fonts[0];
//!
//!     let mut evaluator = Evaluator::new();
//!     let mut sink = Printer;
//!     font.visit_glyph(1, &mut evaluator, &mut sink, 1.0)?;
//!     Ok(())
//! }
//! ```

pub mod binary;
pub mod cff;
pub mod error;
pub mod outline;
pub mod size;

#[cfg(test)]
mod tests;

pub use pathfinder_geometry;

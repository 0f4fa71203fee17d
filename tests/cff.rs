mod common;

use std::fmt::Write;

use cff_outline::binary::read::ReadScope;
use cff_outline::cff::charstring::{Instruction, Type2Op};
use cff_outline::cff::compact::{expand, Compacter};
use cff_outline::cff::outline::Evaluator;
use cff_outline::cff::{CFFError, Charset, FontSet, ParseOptions};
use cff_outline::outline::OutlineSink;
use cff_outline::pathfinder_geometry::line_segment::LineSegment2F;
use cff_outline::pathfinder_geometry::vector::Vector2F;

use crate::common::writer::{convert, CffBuilder, TtfType::*};

const RMOVETO: u8 = 21;
const RLINETO: u8 = 5;
const HLINETO: u8 = 6;
const RRCURVETO: u8 = 8;
const ENDCHAR: u8 = 14;
const HSTEMHM: u8 = 18;
const HINTMASK: u8 = 19;
const CALLSUBR: u8 = 10;
const RETURN: u8 = 11;

/// Records every sink call as text.
#[derive(Default)]
struct Recorder(String);

impl OutlineSink for Recorder {
    fn begin_contour_set(&mut self, count: Option<usize>) {
        writeln!(&mut self.0, "begin {:?}", count).unwrap();
    }

    fn move_to(&mut self, to: Vector2F) {
        writeln!(&mut self.0, "move_to {} {}", to.x(), to.y()).unwrap();
    }

    fn line_to(&mut self, to: Vector2F) {
        writeln!(&mut self.0, "line_to {} {}", to.x(), to.y()).unwrap();
    }

    fn cubic_curve_to(&mut self, ctrl: LineSegment2F, to: Vector2F) {
        writeln!(
            &mut self.0,
            "curve_to {} {} {} {} {} {}",
            ctrl.from_x(),
            ctrl.from_y(),
            ctrl.to_x(),
            ctrl.to_y(),
            to.x(),
            to.y()
        )
        .unwrap();
    }

    fn close_contour(&mut self) {
        writeln!(&mut self.0, "close").unwrap();
    }

    fn end_contour_set(&mut self) {
        writeln!(&mut self.0, "end").unwrap();
    }
}

fn visit(font_set: &FontSet<'_>, glyph_id: u16, scale: f32) -> String {
    let font = &font_set.fonts[0];
    let mut recorder = Recorder::default();
    font.visit_glyph(glyph_id, &mut Evaluator::new(), &mut recorder, scale)
        .unwrap();
    recorder.0
}

/// A font with `.notdef` and a glyph named `A` through a format 0 charset.
fn two_glyph_font(glyph: &[u8]) -> CffBuilder {
    let mut builder = CffBuilder::new();
    builder.char_strings = vec![convert(&[Op(ENDCHAR)]), glyph.to_vec()];
    // SID 34 is "A"
    builder.charset = Some(convert(&[UInt8(0), UInt16(34)]));
    builder.private_dict = convert(&[CFFInt(600), Op(20), CFFInt(500), Op(21)]);
    builder
}

#[test]
fn move_to_only_glyph() {
    let glyph = convert(&[CFFInt(0), CFFInt(0), Op(RMOVETO), Op(ENDCHAR)]);
    let data = two_glyph_font(&glyph).build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();

    assert_eq!(font_set.font_names, vec![String::from("TestFont")]);
    let font = &font_set.fonts[0];
    assert_eq!(font.glyphs.len(), 2);
    assert_eq!(font.glyphs[0].data.name.as_deref(), Some(".notdef"));
    assert_eq!(font.glyphs[1].data.name.as_deref(), Some("A"));
    assert_eq!(font.glyphs[1].data.sid, 34);
    assert!(matches!(font.charset, Charset::Custom(_)));
    assert_eq!(font.glyph_by_name("A").map(|glyph| glyph.glyph_index), Some(1));
    assert_eq!(
        font.glyph_names().collect::<Vec<_>>(),
        vec![(0, ".notdef"), (1, "A")]
    );

    assert_eq!(
        visit(&font_set, 1, 1.0),
        "begin None\nmove_to 0 0\nclose\nend\n"
    );
}

#[test]
fn relative_lines_with_scale() {
    let glyph = convert(&[
        CFFInt(100),
        CFFInt(100),
        Op(RLINETO),
        CFFInt(200),
        CFFInt(200),
        Op(RLINETO),
        Op(ENDCHAR),
    ]);
    let data = two_glyph_font(&glyph).build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();

    assert_eq!(
        visit(&font_set, 1, 1.0),
        "begin None\nline_to 100 100\nline_to 300 300\nend\n"
    );
    assert_eq!(
        visit(&font_set, 1, 2.0),
        "begin None\nline_to 200 200\nline_to 600 600\nend\n"
    );
}

#[test]
fn implicit_vstem_before_hintmask() {
    let glyph = convert(&[
        CFFInt(5),
        CFFInt(10),
        CFFInt(15),
        CFFInt(20),
        Op(HSTEMHM),
        Op(HINTMASK),
        UInt8(0b1100_0000),
        CFFInt(10),
        CFFInt(10),
        Op(RMOVETO),
        Op(ENDCHAR),
    ]);
    let data = two_glyph_font(&glyph).build();
    let options = ParseOptions::default().compact_instructions(false);
    let font_set = FontSet::read_with(ReadScope::new(&data), options).unwrap();
    let glyph = &font_set.fonts[0].glyphs[1];

    assert_eq!(
        glyph.data.instructions(),
        &[
            Instruction::load_int(5),
            Instruction::load_int(10),
            Instruction::load_int(15),
            Instruction::load_int(20),
            Instruction::op(Type2Op::HStemHm),
            Instruction::op(Type2Op::VStem),
            Instruction::with_value(Type2Op::HintMask1, 0xC0 << 24),
            Instruction::load_int(10),
            Instruction::load_int(10),
            Instruction::op(Type2Op::RMoveTo),
            Instruction::op(Type2Op::EndChar),
        ]
    );
    assert_eq!(
        visit(&font_set, 1, 1.0),
        "begin None\nmove_to 10 10\nclose\nend\n"
    );
}

#[test]
fn advance_widths() {
    let glyph = convert(&[CFFInt(-50), CFFInt(10), CFFInt(20), Op(RMOVETO), Op(ENDCHAR)]);
    let data = two_glyph_font(&glyph).build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();
    let font = &font_set.fonts[0];

    assert_eq!(font.default_width_x, 600.);
    assert_eq!(font.nominal_width_x, 500.);
    assert_eq!(font.advance_width(0), Some(600.));
    assert_eq!(font.glyphs[1].data.width_delta(), Some(-50));
    assert_eq!(font.advance_width(1), Some(450.));
    assert_eq!(font.advance_width(2), None);
    assert_eq!(
        visit(&font_set, 1, 1.0),
        "begin None\nmove_to 10 20\nclose\nend\n"
    );
}

#[test]
fn local_subroutines() {
    let glyph = convert(&[
        CFFInt(10),
        CFFInt(20),
        Op(RMOVETO),
        CFFInt(-107),
        Op(CALLSUBR),
        CFFInt(-106),
        Op(CALLSUBR),
        Op(ENDCHAR),
    ]);
    let mut builder = two_glyph_font(&glyph);
    builder.local_subrs = vec![
        convert(&[CFFInt(30), Op(HLINETO), Op(RETURN)]),
        convert(&[
            CFFInt(1),
            CFFInt(2),
            CFFInt(3),
            CFFInt(4),
            CFFInt(5),
            CFFInt(6),
            Op(RRCURVETO),
            Op(RETURN),
        ]),
    ];
    let data = builder.build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();

    assert!(font_set.fonts[0].local_subr_index.is_some());
    assert_eq!(
        visit(&font_set, 1, 1.0),
        "begin None\nmove_to 10 20\nline_to 40 20\ncurve_to 41 22 44 26 49 32\nclose\nend\n"
    );
}

#[test]
fn cid_keyed_font() {
    let mut builder = CffBuilder::new();
    builder.strings = vec![String::from("Adobe"), String::from("Identity")];
    // Adobe Identity 0 ROS
    builder.top_dict = convert(&[CFFInt(391), CFFInt(392), CFFInt(0), Op2(30)]);
    builder.char_strings = vec![
        convert(&[Op(ENDCHAR)]),
        convert(&[CFFInt(10), CFFInt(0), CFFInt(0), Op(RMOVETO), Op(ENDCHAR)]),
        convert(&[CFFInt(5), CFFInt(5), Op(RMOVETO), Op(ENDCHAR)]),
    ];
    // Format 3: two ranges then the sentinel
    builder.fd_select = Some(convert(&[
        UInt8(3),
        UInt16(2),
        UInt16(0),
        UInt8(0),
        UInt16(1),
        UInt8(1),
        UInt16(3),
    ]));
    builder.font_dict_privates = vec![
        convert(&[CFFInt(300), Op(20)]),
        convert(&[CFFInt(700), Op(20), CFFInt(200), Op(21)]),
    ];
    let data = builder.build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();
    let font = &font_set.fonts[0];

    assert!(font.is_cid_keyed());
    let cid = font.cid.as_ref().unwrap();
    assert_eq!(cid.registry.as_deref(), Some("Adobe"));
    assert_eq!(cid.ordering.as_deref(), Some("Identity"));
    assert_eq!(cid.cid_count, 8720);
    assert_eq!(font.font_dicts.len(), 2);
    assert!(font.encoding.is_none());

    let fd_indices = font
        .glyphs
        .iter()
        .map(|glyph| glyph.font_dict_index)
        .collect::<Vec<_>>();
    assert_eq!(fd_indices, vec![Some(0), Some(1), Some(1)]);
    assert_eq!(font.glyphs[0].data.name.as_deref(), Some(".notdef"));
    assert_eq!(font.glyphs[2].data.name, None);
    assert_eq!(font.glyphs[2].data.sid, 2);

    assert_eq!(font.advance_width(0), Some(300.));
    assert_eq!(font.advance_width(1), Some(210.));
    assert_eq!(font.advance_width(2), Some(700.));
    assert_eq!(
        visit(&font_set, 2, 1.0),
        "begin None\nmove_to 5 5\nclose\nend\n"
    );
}

#[test]
fn compaction_round_trips_decoded_glyphs() {
    let glyph = convert(&[
        CFFInt(-50),
        CFFInt(5),
        CFFInt(10),
        CFFInt(15),
        CFFInt(20),
        Op(HSTEMHM),
        Op(HINTMASK),
        UInt8(0b1000_0000),
        CFFInt(100),
        CFFInt(-300),
        Op(RMOVETO),
        CFFInt(1),
        CFFInt(2),
        CFFInt(3),
        CFFInt(1000),
        CFFInt(-1000),
        CFFInt(32767),
        Op(RRCURVETO),
        CFFInt(7),
        Op(HLINETO),
        Op(ENDCHAR),
    ]);
    let data = two_glyph_font(&glyph).build();

    let options = ParseOptions::default().compact_instructions(false);
    let plain = FontSet::read_with(ReadScope::new(&data), options).unwrap();
    let compacted = FontSet::read(ReadScope::new(&data)).unwrap();

    for (plain, compacted) in plain.fonts[0].glyphs.iter().zip(&compacted.fonts[0].glyphs) {
        assert!(!plain.data.is_compacted());
        assert!(compacted.data.is_compacted());
        assert_eq!(
            expand(compacted.data.instructions()),
            plain.data.instructions()
        );
        assert_eq!(
            compacted.data.expanded_instructions().as_ref(),
            plain.data.instructions()
        );
        assert_eq!(
            Compacter::new().compact(plain.data.instructions()),
            compacted.data.instructions()
        );
    }
    assert!(
        compacted.fonts[0].glyphs[1].data.instructions().len()
            < plain.fonts[0].glyphs[1].data.instructions().len()
    );
    assert_eq!(visit(&plain, 1, 1.0), visit(&compacted, 1, 1.0));
}

#[test]
fn unsupported_versions() {
    let data = [3, 0, 4, 1];
    assert!(matches!(
        FontSet::read(ReadScope::new(&data)),
        Err(CFFError::UnsupportedVersion(3))
    ));

    let data = [2, 0, 5, 0, 0];
    assert!(matches!(
        FontSet::read(ReadScope::new(&data)),
        Err(CFFError::UnsupportedVersion(2))
    ));
}

#[test]
fn hintmask_overrun() {
    // The mask byte is missing
    let glyph = convert(&[CFFInt(5), CFFInt(10), Op(HSTEMHM), Op(HINTMASK)]);
    let data = two_glyph_font(&glyph).build();
    assert!(matches!(
        FontSet::read(ReadScope::new(&data)),
        Err(CFFError::HintMaskOverrun)
    ));
}

#[test]
fn string_lookup() {
    let mut builder = two_glyph_font(&convert(&[Op(ENDCHAR)]));
    builder.strings = vec![String::from("Custom")];
    let data = builder.build();
    let font_set = FontSet::read(ReadScope::new(&data)).unwrap();

    assert_eq!(font_set.string(0), Some(".notdef"));
    assert_eq!(font_set.string(34), Some("A"));
    assert_eq!(font_set.string(391), Some("Custom"));
    assert_eq!(font_set.string(392), None);
}

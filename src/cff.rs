//! CFF font handling.
//!
//! Refer to [Technical Note #5176](http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5176.CFF.pdf)
//! for more information.
//!
//! A CFF table is decoded into a [FontSet] holding a single [Font]. While the font is read every
//! glyph's Type 2 charstring is decoded into a flat list of [Instruction]s with all subroutine
//! calls inlined, ready to be handed to the [Evaluator](outline::Evaluator).

use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::iter;
use std::marker::PhantomData;

use itertools::Itertools;
use lazy_static::lazy_static;
use log::warn;
use num_traits as num;
use rustc_hash::FxHashMap;
use tinyvec::{tiny_vec, TinyVec};

use crate::binary::read::{ReadArray, ReadBinary, ReadCtxt, ReadEof, ReadFrom, ReadScope};
use crate::binary::{U16Be, U8};
use crate::error::ParseError;
use crate::outline::OutlineSink;

use charstring::{CharStringDecoder, Instruction, Subroutines, Type2Op};
use compact::Compacter;
use outline::Evaluator;

mod cff2;
pub mod charstring;
pub mod compact;
pub mod outline;

// CFF Spec: An operator may be preceded by up to a maximum of 48 operands. Longer entries are
// still read, with a warning.
const MAX_OPERANDS: usize = 48;
const END_OF_FLOAT_FLAG: u8 = 0xf;

const OPERAND_ZERO: [Operand; 1] = [Operand::Integer(0)];
const DEFAULT_UNDERLINE_POSITION: [Operand; 1] = [Operand::Integer(-100)];
const DEFAULT_UNDERLINE_THICKNESS: [Operand; 1] = [Operand::Integer(50)];
const DEFAULT_CHARSTRING_TYPE: [Operand; 1] = [Operand::Integer(2)];
lazy_static! {
    static ref DEFAULT_FONT_MATRIX: [Operand; 6] = {
        let real_0_001 = Operand::Real(Real(tiny_vec![0x0a, 0x00, 0x1f])); // 0.001
        [
            real_0_001.clone(),
            Operand::Integer(0),
            Operand::Integer(0),
            real_0_001,
            Operand::Integer(0),
            Operand::Integer(0),
        ]
    };
}
const DEFAULT_BBOX: [Operand; 4] = [
    Operand::Integer(0),
    Operand::Integer(0),
    Operand::Integer(0),
    Operand::Integer(0),
];
const DEFAULT_CID_COUNT: [Operand; 1] = [Operand::Integer(8720)];
const DEFAULT_BLUE_SHIFT: [Operand; 1] = [Operand::Integer(7)];
const DEFAULT_BLUE_FUZZ: [Operand; 1] = [Operand::Integer(1)];
lazy_static! {
    static ref DEFAULT_BLUE_SCALE: [Operand; 1] =
        [Operand::Real(Real(tiny_vec![0x0a, 0x03, 0x96, 0x25, 0xff]))]; // 0.039625
    static ref DEFAULT_EXPANSION_FACTOR: [Operand; 1] =
        [Operand::Real(Real(tiny_vec![0x0a, 0x06, 0xff]))]; // 0.06
}

const ISO_ADOBE_LAST_SID: u16 = 228;

// A string id in the font
type SID = u16;

/// Options that control how a CFF table is decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Store glyph instructions in compacted form.
    ///
    /// Compaction packs runs of small integer loads into single instructions. It does not change
    /// the result of evaluating a glyph. See [compact].
    pub compact_instructions: bool,
}

/// Top level representation of a CFF font set, typically read from a CFF OpenType table.
///
/// Refer to Technical Note #5176
#[derive(Clone)]
pub struct FontSet<'a> {
    pub header: Header,
    /// PostScript names from the Name INDEX.
    pub font_names: Vec<String>,
    /// Strings from the String INDEX, in INDEX order. SID 391 is the first entry.
    pub strings: Vec<String>,
    pub fonts: Vec<Font<'a>>,
}

/// CFF Font Header described in Section 6 of Technical Note #5176
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub major: u8,
    pub minor: u8,
    pub hdr_size: u8,
    pub off_size: u8,
}

/// A CFF INDEX described in Section 5 of Technical Note #5176
#[derive(Clone)]
pub struct Index<'a> {
    pub count: usize,
    off_size: u8,
    offset_array: &'a [u8],
    data_array: &'a [u8],
}

/// Location of one INDEX object within the data of its INDEX.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub start: usize,
    pub length: usize,
}

/// A single decoded font program within a CFF font set
#[derive(Clone)]
pub struct Font<'a> {
    /// PostScript name of the font, from the Name INDEX.
    pub name: String,
    pub version: Option<String>,
    pub notice: Option<String>,
    pub copyright: Option<String>,
    pub full_name: Option<String>,
    pub family_name: Option<String>,
    pub weight: Option<String>,
    pub underline_position: f64,
    pub underline_thickness: f64,
    /// xMin, yMin, xMax, yMax
    pub font_bbox: [f64; 4],
    pub italic_angle: f64,
    pub is_fixed_pitch: bool,
    pub default_width_x: f64,
    pub nominal_width_x: f64,
    /// Glyphs indexed by glyph id. Glyph 0 is `.notdef`.
    pub glyphs: Vec<Glyph>,
    pub top_dict: TopDict,
    /// The Private DICT of a non-CID font.
    pub private_dict: Option<PrivateDict>,
    /// Present when the font is CID-keyed.
    pub cid: Option<CidInfo>,
    /// Font DICTs from the FDArray of a CID-keyed font.
    pub font_dicts: Vec<CidFontDict<'a>>,
    pub global_subr_index: Index<'a>,
    /// Local subroutines of a non-CID font.
    pub local_subr_index: Option<Index<'a>>,
    pub charset: Charset<'a>,
    /// Encoding of a non-CID font. CID-keyed fonts have no encoding.
    pub encoding: Option<Encoding<'a>>,
}

#[derive(Clone, Debug)]
pub struct Glyph {
    pub glyph_index: u16,
    /// Index into [Font::font_dicts] selected by FDSelect for CID-keyed fonts.
    pub font_dict_index: Option<u8>,
    pub data: GlyphData,
}

#[derive(Clone, Debug)]
pub struct GlyphData {
    /// Glyph name resolved from the charset, `None` for CID-keyed fonts or an unresolved SID.
    pub name: Option<String>,
    /// The SID of the glyph name, or the CID for CID-keyed fonts. 0 when the charset does not
    /// cover the glyph.
    pub sid: u16,
    instructions: Box<[Instruction]>,
    compacted: bool,
}

/// Registry-Ordering-Supplement and related Top DICT data of a CID-keyed font.
#[derive(Clone, Debug)]
pub struct CidInfo {
    pub registry: Option<String>,
    pub ordering: Option<String>,
    pub supplement: f64,
    pub cid_font_version: f64,
    pub cid_count: u32,
    pub fd_array_offset: usize,
    pub fd_select_offset: usize,
    pub fd_select: Option<FDSelect>,
}

/// A Font DICT from the FDArray of a CID-keyed font, along with its Private DICT data.
#[derive(Clone)]
pub struct CidFontDict<'a> {
    pub name: Option<String>,
    pub name_sid: Option<SID>,
    pub private_dict_size: usize,
    pub private_dict_offset: usize,
    pub private_dict: PrivateDict,
    pub default_width_x: f64,
    pub nominal_width_x: f64,
    pub local_subr_index: Option<Index<'a>>,
}

/// A list of errors that can occur when decoding CFF data and Type 2 charstrings.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CFFError {
    ParseError(ParseError),
    /// The Name INDEX holds more than one font.
    MultipleFonts,
    /// The Top DICT INDEX holds more than one DICT.
    MultipleTopDicts,
    UnsupportedVersion(u8),
    UnsupportedCharsetFormat(u8),
    UnsupportedEncodingFormat(u8),
    UnsupportedFDSelectFormat(u8),
    InvalidOperator,
    /// A hintmask or cntrmask needs more mask bytes than the charstring holds.
    HintMaskOverrun,
    /// FDSelect does not map the glyph to a Font DICT.
    GlyphOutsideFDRanges(u16),
    /// The operand of a subroutine call is not an integer.
    InvalidSubroutineCall,
    InvalidSubroutineIndex,
    NoLocalSubroutines,
    NestingLimitReached,
    /// A subroutine call was found while evaluating, it should have been inlined when decoding.
    UnexpectedSubroutineCall,
    InvalidArgumentsStackLength,
    ArgumentsStackLimitReached,
    /// The width of a glyph was not a plain integer.
    InvalidWidth,
}

// Encoding data is located via the offset operand to the Encoding operator in the Top DICT. Only
// one Encoding operator can be specified per font except for CIDFonts which specify no encoding.
#[derive(Clone)]
pub enum Encoding<'a> {
    Standard,
    Expert,
    Custom(CustomEncoding<'a>),
}

#[derive(Clone)]
pub struct CustomEncoding<'a> {
    pub codes: EncodingCodes<'a>,
    /// Additional code to SID mappings, present when the high bit of the format is set.
    pub supplements: Vec<EncodingSupplement>,
}

#[derive(Clone)]
pub enum EncodingCodes<'a> {
    Format0 {
        codes: ReadArray<'a, U8>,
    },
    Format1 {
        ranges: ReadArray<'a, Range<u8, u8>>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodingSupplement {
    pub code: u8,
    pub sid: SID,
}

#[derive(Clone)]
pub enum Charset<'a> {
    ISOAdobe,
    Expert,
    ExpertSubset,
    Custom(CustomCharset<'a>),
}

#[derive(Clone)]
pub enum CustomCharset<'a> {
    Format0 {
        glyphs: ReadArray<'a, U16Be>,
    },
    Format1 {
        ranges: ReadArray<'a, Range<SID, u8>>,
    },
    Format2 {
        ranges: ReadArray<'a, Range<SID, u16>>,
    },
}

/// A Range from `first` to `first + n_left`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range<F, N> {
    pub first: F,
    pub n_left: N,
}

/// A CFF DICT described in Section 4 of Technical Note #5176
#[derive(Debug, PartialEq, Clone)]
pub struct Dict<T>
where
    T: DictDefault,
{
    dict: Vec<(Operator, Vec<Operand>)>,
    default: PhantomData<T>,
}

/// The default values of a DICT
pub trait DictDefault {
    /// Returns the default operand(s) if any for the supplied `op`.
    fn default(op: Operator) -> Option<&'static [Operand]>;
}

#[derive(Debug, PartialEq, Clone)]
pub struct TopDictDefault;

#[derive(Debug, PartialEq, Clone)]
pub struct FontDictDefault;

#[derive(Debug, PartialEq, Clone)]
pub struct PrivateDictDefault;

pub type TopDict = Dict<TopDictDefault>;

pub type FontDict = Dict<FontDictDefault>;

pub type PrivateDict = Dict<PrivateDictDefault>;

/// Font DICT select as described in Section 19 of Technical Note #5176
///
/// Only format 3 is supported.
#[derive(Clone, Debug, PartialEq)]
pub struct FDSelect {
    pub ranges: Vec<FDRange>,
    /// One past the last glyph id covered, equal to the number of glyphs.
    pub sentinel: u16,
}

/// First glyph of a run of glyphs that use the same Font DICT.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FDRange {
    pub first: u16,
    pub fd_index: u8,
}

/// Sequential lookup of the Font DICT for each glyph.
///
/// Glyph ids must be queried in ascending order, as they are when the CharStrings INDEX is
/// decoded. Out of order queries are not supported.
pub struct FDRangeProvider<'a> {
    ranges: &'a [FDRange],
    sentinel: u16,
    current: usize,
}

/// CFF DICT operator
#[derive(Debug, PartialEq)]
enum Op {
    /// One byte operators are stored as is, two byte operators as `(12 << 8) | b1`.
    Operator(u16),
    Operand(Operand),
}

/// CFF operand to an operator
#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Integer(i32),
    Real(Real),
}

// On a corpus of 23945 CFF fonts real values were encountered as follows:
//     572 2 bytes
//     776 3 bytes
//    1602 4 bytes
//   14037 5 bytes
//    3491 6 bytes
//      36 7 bytes
// Using 7 bytes for the tiny vec covers all these, fits in a register on 64-bit systems,
// allows Operand to be 8 bytes on 64-bit systems, and is considerably smaller than the 24 bytes
// used by Vec.

/// A real number
///
/// To parse the value into `f64` use the `TryFrom`/`TryInto` impl.
#[derive(Debug, PartialEq, Clone)]
pub struct Real(TinyVec<[u8; 7]>);

#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Operator {
    Version = 0,
    Notice = 1,
    FullName = 2,
    FamilyName = 3,
    Weight = 4,
    FontBBox = 5,
    BlueValues = 6,
    OtherBlues = 7,
    FamilyBlues = 8,
    FamilyOtherBlues = 9,
    StdHW = 10,
    StdVW = 11,
    UniqueID = 13,
    XUID = 14,
    Charset = 15,
    Encoding = 16,
    CharStrings = 17,
    Private = 18,
    Subrs = 19,
    DefaultWidthX = 20,
    NominalWidthX = 21,
    Copyright = op2(0),
    IsFixedPitch = op2(1),
    ItalicAngle = op2(2),
    UnderlinePosition = op2(3),
    UnderlineThickness = op2(4),
    PaintType = op2(5),
    CharstringType = op2(6),
    FontMatrix = op2(7),
    StrokeWidth = op2(8),
    BlueScale = op2(9),
    BlueShift = op2(10),
    BlueFuzz = op2(11),
    StemSnapH = op2(12),
    StemSnapV = op2(13),
    ForceBold = op2(14),
    LanguageGroup = op2(17),
    ExpansionFactor = op2(18),
    InitialRandomSeed = op2(19),
    SyntheticBase = op2(20),
    PostScript = op2(21),
    BaseFontName = op2(22),
    BaseFontBlend = op2(23),
    ROS = op2(30),
    CIDFontVersion = op2(31),
    CIDFontRevision = op2(32),
    CIDFontType = op2(33),
    CIDCount = op2(34),
    UIDBase = op2(35),
    FDArray = op2(36),
    FDSelect = op2(37),
    FontName = op2(38),
}

const fn op2(value: u8) -> u16 {
    (12 << 8) | (value as u16)
}

/// The shape of the operands an operator expects.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperandKind {
    Sid,
    Boolean,
    Number,
    Array,
    /// An array where each value after the first is relative to the previous one.
    Delta,
    NumberNumber,
    SidSidNumber,
}

/// Registry entry for a DICT operator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OperatorInfo {
    pub operator: Operator,
    pub name: &'static str,
    pub kind: OperandKind,
}

lazy_static! {
    static ref OPERATORS: FxHashMap<u16, OperatorInfo> = {
        use OperandKind::*;

        [
            (Operator::Version, "version", Sid),
            (Operator::Notice, "Notice", Sid),
            (Operator::FullName, "FullName", Sid),
            (Operator::FamilyName, "FamilyName", Sid),
            (Operator::Weight, "Weight", Sid),
            (Operator::FontBBox, "FontBBox", Array),
            (Operator::BlueValues, "BlueValues", Delta),
            (Operator::OtherBlues, "OtherBlues", Delta),
            (Operator::FamilyBlues, "FamilyBlues", Delta),
            (Operator::FamilyOtherBlues, "FamilyOtherBlues", Delta),
            (Operator::StdHW, "StdHW", Number),
            (Operator::StdVW, "StdVW", Number),
            (Operator::UniqueID, "UniqueID", Number),
            (Operator::XUID, "XUID", Array),
            (Operator::Charset, "charset", Number),
            (Operator::Encoding, "Encoding", Number),
            (Operator::CharStrings, "CharStrings", Number),
            (Operator::Private, "Private", NumberNumber),
            (Operator::Subrs, "Subrs", Number),
            (Operator::DefaultWidthX, "defaultWidthX", Number),
            (Operator::NominalWidthX, "nominalWidthX", Number),
            (Operator::Copyright, "Copyright", Sid),
            (Operator::IsFixedPitch, "isFixedPitch", Boolean),
            (Operator::ItalicAngle, "ItalicAngle", Number),
            (Operator::UnderlinePosition, "UnderlinePosition", Number),
            (Operator::UnderlineThickness, "UnderlineThickness", Number),
            (Operator::PaintType, "PaintType", Number),
            (Operator::CharstringType, "CharstringType", Number),
            (Operator::FontMatrix, "FontMatrix", Array),
            (Operator::StrokeWidth, "StrokeWidth", Number),
            (Operator::BlueScale, "BlueScale", Number),
            (Operator::BlueShift, "BlueShift", Number),
            (Operator::BlueFuzz, "BlueFuzz", Number),
            (Operator::StemSnapH, "StemSnapH", Delta),
            (Operator::StemSnapV, "StemSnapV", Delta),
            (Operator::ForceBold, "ForceBold", Boolean),
            (Operator::LanguageGroup, "LanguageGroup", Number),
            (Operator::ExpansionFactor, "ExpansionFactor", Number),
            (Operator::InitialRandomSeed, "initialRandomSeed", Number),
            (Operator::SyntheticBase, "SyntheticBase", Number),
            (Operator::PostScript, "PostScript", Sid),
            (Operator::BaseFontName, "BaseFontName", Sid),
            (Operator::BaseFontBlend, "BaseFontBlend", Delta),
            (Operator::ROS, "ROS", SidSidNumber),
            (Operator::CIDFontVersion, "CIDFontVersion", Number),
            (Operator::CIDFontRevision, "CIDFontRevision", Number),
            (Operator::CIDFontType, "CIDFontType", Number),
            (Operator::CIDCount, "CIDCount", Number),
            (Operator::UIDBase, "UIDBase", Number),
            (Operator::FDArray, "FDArray", Number),
            (Operator::FDSelect, "FDSelect", Number),
            (Operator::FontName, "FontName", Sid),
        ]
        .iter()
        .map(|&(operator, name, kind)| (operator as u16, OperatorInfo { operator, name, kind }))
        .collect()
    };
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            compact_instructions: true,
        }
    }
}

impl ParseOptions {
    pub fn compact_instructions(mut self, compact: bool) -> Self {
        self.compact_instructions = compact;
        self
    }
}

impl<'a> FontSet<'a> {
    /// Read a CFF table using the default [ParseOptions].
    ///
    /// `scope` must start at the CFF header; offsets inside the table are relative to it.
    pub fn read(scope: ReadScope<'a>) -> Result<FontSet<'a>, CFFError> {
        Self::read_with(scope, ParseOptions::default())
    }

    pub fn read_with(scope: ReadScope<'a>, options: ParseOptions) -> Result<FontSet<'a>, CFFError> {
        // From section 6 of Technical Note #5176:
        // Implementations reading font set files must include code to check version numbers so
        // that if and when the format and therefore the version number changes, older
        // implementations will reject newer versions gracefully.
        let major = scope.read::<U8>()?;
        match major {
            1 => read_font_set(scope, options),
            2 => cff2::read_cff2(scope),
            _ => Err(CFFError::UnsupportedVersion(major)),
        }
    }

    /// Resolve a SID to a string, either a standard string or one from the String INDEX.
    ///
    /// Returns `None` if `sid` is beyond the end of the String INDEX.
    pub fn string(&self, sid: SID) -> Option<&str> {
        resolve_string(&self.strings, sid)
    }
}

/// Read a string with the given SID from the standard strings or the String INDEX
fn resolve_string(strings: &[String], sid: SID) -> Option<&str> {
    let sid = usize::from(sid);
    // When the client needs to determine the string that corresponds to a particular SID it
    // performs the following: test if SID is in standard range then fetch from internal table,
    // otherwise, fetch string from the String INDEX using a value of (SID – nStdStrings) as
    // the index
    match STANDARD_STRINGS.get(sid) {
        Some(string) => Some(string),
        None => strings
            .get(sid - STANDARD_STRINGS.len())
            .map(String::as_str),
    }
}

fn decode_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn to_offset(value: i32) -> Result<usize, ParseError> {
    usize::try_from(value).map_err(ParseError::from)
}

fn read_font_set<'a>(scope: ReadScope<'a>, options: ParseOptions) -> Result<FontSet<'a>, CFFError> {
    let mut ctxt = scope.ctxt();
    let header = ctxt.read::<Header>()?;

    let name_index = ctxt.read::<Index<'_>>()?;
    match name_index.count {
        0 => return Err(ParseError::MissingValue.into()),
        1 => {}
        _ => return Err(CFFError::MultipleFonts),
    }
    let font_names = name_index.iter().map(decode_string).collect_vec();

    let top_dict_index = ctxt.read::<Index<'_>>()?;
    match top_dict_index.count {
        0 => return Err(ParseError::MissingValue.into()),
        1 => {}
        _ => return Err(CFFError::MultipleTopDicts),
    }
    let top_dict = top_dict_index.read::<TopDict>(0)?;

    let string_index = ctxt.read::<Index<'_>>()?;
    let strings = string_index.iter().map(decode_string).collect_vec();

    let global_subr_index = ctxt.read::<Index<'_>>()?;

    let name = font_names.first().cloned().unwrap_or_default();
    let font = read_font(&scope, name, top_dict, &strings, global_subr_index, options)?;

    Ok(FontSet {
        header,
        font_names,
        strings,
        fonts: vec![font],
    })
}

fn read_font<'a>(
    scope: &ReadScope<'a>,
    name: String,
    top_dict: TopDict,
    strings: &[String],
    global_subr_index: Index<'a>,
    options: ParseOptions,
) -> Result<Font<'a>, CFFError> {
    let string = |operator| {
        top_dict
            .get_sid(operator)
            .and_then(|sid| resolve_string(strings, sid))
            .map(String::from)
    };
    let version = string(Operator::Version);
    let notice = string(Operator::Notice);
    let copyright = string(Operator::Copyright);
    let full_name = string(Operator::FullName);
    let family_name = string(Operator::FamilyName);
    let weight = string(Operator::Weight);

    let underline_position = top_dict.get_f64(Operator::UnderlinePosition).unwrap_or(Ok(-100.))?;
    let underline_thickness = top_dict.get_f64(Operator::UnderlineThickness).unwrap_or(Ok(50.))?;
    let italic_angle = top_dict.get_f64(Operator::ItalicAngle).unwrap_or(Ok(0.))?;
    let is_fixed_pitch = top_dict.get_i32(Operator::IsFixedPitch).unwrap_or(Ok(0))? != 0;
    let font_bbox = read_font_bbox(&top_dict)?;

    // The Top DICT of a CIDFont begins with the ROS operator. This is also where FDSelect is read.
    let cid = read_cid_info(scope, &top_dict, strings)?;

    let font_dicts = match &cid {
        Some(cid) if cid.fd_array_offset != 0 => {
            read_font_dicts(scope, cid.fd_array_offset, strings)?
        }
        _ => Vec::new(),
    };

    let (private_dict, local_subr_index) = match cid {
        Some(_) => (None, None),
        None => match top_dict.read_private_dict(scope)? {
            Some((private_dict, private_dict_offset)) => {
                let local_subr_index =
                    read_local_subr_index(scope, &private_dict, private_dict_offset)?;
                (Some(private_dict), local_subr_index)
            }
            None => (None, None),
        },
    };
    let (default_width_x, nominal_width_x) = match &private_dict {
        Some(private_dict) => read_widths(private_dict)?,
        None => (0., 0.),
    };

    let offset = top_dict
        .get_i32(Operator::CharStrings)
        .ok_or(ParseError::MissingValue)??;
    let char_strings_index = scope.offset(to_offset(offset)?).read::<Index<'a>>()?;
    let n_glyphs = char_strings_index.count;

    let decoded = {
        let global_subrs = Subroutines::new(&global_subr_index);
        let local_subrs = local_subr_index.as_ref().map(Subroutines::new);
        let font_dict_subrs = font_dicts
            .iter()
            .map(|font_dict| font_dict.local_subr_index.as_ref().map(Subroutines::new))
            .collect_vec();
        let mut fd_ranges = cid
            .as_ref()
            .and_then(|cid| cid.fd_select.as_ref())
            .map(FDSelect::range_provider);
        let mut compacter = Compacter::new();

        // The caller consumes INDEX objects in order, each following the previous one.
        let mut data = ReadScope::new(char_strings_index.data_array).ctxt();
        let mut decoded = Vec::with_capacity(n_glyphs);
        for (glyph_index, entry) in char_strings_index.descriptors()?.into_iter().enumerate() {
            let glyph_index = u16::try_from(glyph_index).map_err(ParseError::from)?;
            let char_string = data.read_slice(entry.length)?;

            let (font_dict_index, decoder) = match fd_ranges.as_mut() {
                Some(fd_ranges) => {
                    let fd_index = fd_ranges.select_for_glyph(glyph_index)?;
                    let local_subrs = font_dict_subrs
                        .get(usize::from(fd_index))
                        .ok_or(ParseError::BadIndex)?;
                    (
                        Some(fd_index),
                        CharStringDecoder::new(global_subrs, *local_subrs),
                    )
                }
                None => (None, CharStringDecoder::new(global_subrs, local_subrs)),
            };
            let instructions = decoder.decode(char_string)?;
            let instructions = if options.compact_instructions {
                compacter.compact(&instructions)
            } else {
                instructions
            };
            decoded.push((font_dict_index, instructions));
        }
        decoded
    };

    let charset = read_charset(scope, &top_dict, n_glyphs)?;
    let is_cid_keyed = cid.is_some();
    let glyphs = decoded
        .into_iter()
        .zip(charset.glyph_ids(n_glyphs))
        .enumerate()
        .map(|(glyph_index, ((font_dict_index, instructions), id))| {
            let glyph_index = u16::try_from(glyph_index).map_err(ParseError::from)?;
            // Section 11 of Technical Note #5176:
            // By definition the first glyph (GID 0) is “.notdef” and must be present in all fonts.
            let name = match (glyph_index, is_cid_keyed, id) {
                (0, _, _) => Some(String::from(STANDARD_STRINGS[0])),
                (_, false, Some(sid)) => resolve_string(strings, sid).map(String::from),
                _ => None,
            };
            Ok(Glyph {
                glyph_index,
                font_dict_index,
                data: GlyphData::new(
                    name,
                    id.unwrap_or(0),
                    instructions,
                    options.compact_instructions,
                ),
            })
        })
        .collect::<Result<Vec<_>, CFFError>>()?;

    let encoding = match is_cid_keyed {
        true => None,
        false => Some(read_encoding(scope, &top_dict)?),
    };

    Ok(Font {
        name,
        version,
        notice,
        copyright,
        full_name,
        family_name,
        weight,
        underline_position,
        underline_thickness,
        font_bbox,
        italic_angle,
        is_fixed_pitch,
        default_width_x,
        nominal_width_x,
        glyphs,
        top_dict,
        private_dict,
        cid,
        font_dicts,
        global_subr_index,
        local_subr_index,
        charset,
        encoding,
    })
}

fn read_font_bbox(top_dict: &TopDict) -> Result<[f64; 4], ParseError> {
    match top_dict.get_with_default(Operator::FontBBox) {
        Some([x_min, y_min, x_max, y_max]) => Ok([
            x_min.to_f64()?,
            y_min.to_f64()?,
            x_max.to_f64()?,
            y_max.to_f64()?,
        ]),
        Some(_) => Err(ParseError::BadValue),
        None => Ok([0.; 4]),
    }
}

fn read_widths(private_dict: &PrivateDict) -> Result<(f64, f64), ParseError> {
    let default_width_x = private_dict
        .get_f64(Operator::DefaultWidthX)
        .unwrap_or(Ok(0.))?;
    let nominal_width_x = private_dict
        .get_f64(Operator::NominalWidthX)
        .unwrap_or(Ok(0.))?;
    Ok((default_width_x, nominal_width_x))
}

fn read_cid_info<'a>(
    scope: &ReadScope<'a>,
    top_dict: &TopDict,
    strings: &[String],
) -> Result<Option<CidInfo>, CFFError> {
    // The Top DICT begins with ROS operator which specifies the Registry-Ordering-Supplement for
    // the font. This will indicate to a CFF parser that special CID processing should be applied
    // to this font.
    let (registry, ordering, supplement) = match top_dict.get(Operator::ROS) {
        Some([registry, ordering, supplement]) => {
            (registry.to_sid()?, ordering.to_sid()?, supplement.to_f64()?)
        }
        Some(_) => return Err(ParseError::BadValue.into()),
        None => return Ok(None),
    };
    let cid_font_version = top_dict
        .get_f64(Operator::CIDFontVersion)
        .unwrap_or(Ok(0.))?;
    let cid_count = top_dict.get_i32(Operator::CIDCount).unwrap_or(Ok(8720))?;
    let cid_count = u32::try_from(cid_count).map_err(ParseError::from)?;
    let fd_array_offset = top_dict
        .get_i32(Operator::FDArray)
        .transpose()?
        .map(to_offset)
        .transpose()?
        .unwrap_or(0);
    let fd_select_offset = top_dict
        .get_i32(Operator::FDSelect)
        .transpose()?
        .map(to_offset)
        .transpose()?
        .unwrap_or(0);

    let fd_select = match fd_select_offset {
        0 => None,
        offset => Some(FDSelect::read(&mut scope.offset(offset).ctxt())?),
    };

    Ok(Some(CidInfo {
        registry: resolve_string(strings, registry).map(String::from),
        ordering: resolve_string(strings, ordering).map(String::from),
        supplement,
        cid_font_version,
        cid_count,
        fd_array_offset,
        fd_select_offset,
        fd_select,
    }))
}

fn read_font_dicts<'a>(
    scope: &ReadScope<'a>,
    offset: usize,
    strings: &[String],
) -> Result<Vec<CidFontDict<'a>>, CFFError> {
    let font_dict_index = scope.offset(offset).read::<Index<'a>>()?;
    let mut font_dicts = Vec::with_capacity(font_dict_index.count);
    for object in font_dict_index.iter() {
        let font_dict = ReadScope::new(object).read::<FontDict>()?;
        for (operator, _) in font_dict.iter() {
            match operator {
                Operator::FontName | Operator::Private => {}
                _ => warn!("ignoring {} in Font DICT", operator),
            }
        }

        let name_sid = font_dict.get_sid(Operator::FontName);
        let name = name_sid
            .and_then(|sid| resolve_string(strings, sid))
            .map(String::from);
        let (private_dict_size, private_dict_offset) =
            font_dict.private_dict_range()?.unwrap_or((0, 0));
        let private_dict = match private_dict_size {
            0 => PrivateDict::new(),
            _ => scope
                .offset_length(private_dict_offset, private_dict_size)?
                .read::<PrivateDict>()?,
        };
        let local_subr_index = read_local_subr_index(scope, &private_dict, private_dict_offset)?;
        let (default_width_x, nominal_width_x) = read_widths(&private_dict)?;

        font_dicts.push(CidFontDict {
            name,
            name_sid,
            private_dict_size,
            private_dict_offset,
            private_dict,
            default_width_x,
            nominal_width_x,
            local_subr_index,
        });
    }

    Ok(font_dicts)
}

fn read_encoding<'a>(scope: &ReadScope<'a>, top_dict: &TopDict) -> Result<Encoding<'a>, CFFError> {
    let offset = top_dict.get_i32(Operator::Encoding).unwrap_or(Ok(0))?;
    let encoding = match offset {
        0 => Encoding::Standard,
        1 => Encoding::Expert,
        _ => Encoding::Custom(CustomEncoding::read(
            &mut scope.offset(to_offset(offset)?).ctxt(),
        )?),
    };

    Ok(encoding)
}

fn read_charset<'a>(
    scope: &ReadScope<'a>,
    top_dict: &TopDict,
    char_strings_count: usize,
) -> Result<Charset<'a>, CFFError> {
    let offset = top_dict.get_i32(Operator::Charset).unwrap_or(Ok(0))?;
    let charset = match offset {
        0 => Charset::ISOAdobe,
        1 => Charset::Expert,
        2 => Charset::ExpertSubset,
        _ => Charset::Custom(CustomCharset::read(
            &mut scope.offset(to_offset(offset)?).ctxt(),
            char_strings_count,
        )?),
    };

    Ok(charset)
}

fn read_local_subr_index<'a>(
    scope: &ReadScope<'a>,
    private_dict: &PrivateDict,
    private_dict_offset: usize,
) -> Result<Option<Index<'a>>, ParseError> {
    // Local subrs are stored in an INDEX structure which is located via the offset operand
    // of the Subrs operator in the Private DICT. A font without local subrs has no Subrs
    // operator in the Private DICT. The local subrs offset is relative to the beginning of
    // the Private DICT data.
    private_dict
        .get_i32(Operator::Subrs)
        .transpose()?
        .map(|offset| {
            let offset = to_offset(offset)?;
            scope
                .offset(private_dict_offset + offset)
                .read::<Index<'_>>()
        })
        .transpose()
}

impl ReadBinary for Header {
    type HostType<'b> = Self;

    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        let major = ctxt.read_u8()?;
        ctxt.check_version(major == 1)?;
        let minor = ctxt.read_u8()?;
        let hdr_size = ctxt.read_u8()?;
        let off_size = ctxt.read_u8()?;

        if hdr_size < 4 {
            return Err(ParseError::BadValue);
        }

        if off_size < 1 || off_size > 4 {
            return Err(ParseError::BadValue);
        }

        let _unknown = ctxt.read_slice(usize::from(hdr_size - 4))?;

        Ok(Header {
            major,
            minor,
            hdr_size,
            off_size,
        })
    }
}

impl<'b> ReadBinary for Index<'b> {
    type HostType<'a> = Index<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let count = usize::from(ctxt.read_u16be()?);

        if count > 0 {
            let off_size = ctxt.read_u8()?;
            if off_size < 1 || off_size > 4 {
                return Err(ParseError::BadValue);
            }

            let offset_array_size = (count + 1) * usize::from(off_size);
            let offset_array = ctxt.read_slice(offset_array_size)?;

            let last_offset_index = lookup_offset_index(off_size, offset_array, count)?;
            if last_offset_index < 1 {
                return Err(ParseError::BadValue);
            }

            let data_array_size = last_offset_index - 1;
            let data_array = ctxt.read_slice(data_array_size)?;

            let index = Index {
                count,
                off_size,
                offset_array,
                data_array,
            };
            index.descriptors()?;
            Ok(index)
        } else {
            // An empty INDEX is only the count field
            Ok(Index {
                count,
                off_size: 1,
                offset_array: &[],
                data_array: &[],
            })
        }
    }
}

impl<'a> Index<'a> {
    /// Returns the location of each object within the data of this INDEX.
    ///
    /// Offsets are 1-based, so object `i` starts at `offset[i] - 1` and is
    /// `offset[i + 1] - offset[i]` bytes long.
    pub fn descriptors(&self) -> Result<Vec<IndexEntry>, ParseError> {
        (0..self.count)
            .map(|index| {
                let start = lookup_offset_index(self.off_size, self.offset_array, index)?;
                let end = lookup_offset_index(self.off_size, self.offset_array, index + 1)?;
                if start < 1 || end < start || end - 1 > self.data_array.len() {
                    return Err(ParseError::BadOffset);
                }
                Ok(IndexEntry {
                    start: start - 1,
                    length: end - start,
                })
            })
            .collect()
    }

    pub fn read_object(&self, index: usize) -> Option<&'a [u8]> {
        if index < self.count {
            let start_index = lookup_offset_index(self.off_size, self.offset_array, index)
                .ok()?
                .checked_sub(1)?;
            let end_index = lookup_offset_index(self.off_size, self.offset_array, index + 1)
                .ok()?
                .checked_sub(1)?;
            self.data_array.get(start_index..end_index)
        } else {
            None
        }
    }

    pub fn read<T: ReadBinary>(&self, index: usize) -> Result<T::HostType<'a>, ParseError> {
        let data = self.read_object(index).ok_or(ParseError::BadIndex)?;
        ReadScope::new(data).ctxt().read::<T>()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).filter_map(move |index| self.read_object(index))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the size of the data held by this INDEX.
    pub fn data_len(&self) -> usize {
        self.data_array.len()
    }
}

fn lookup_offset_index(off_size: u8, offset_array: &[u8], index: usize) -> Result<usize, ParseError> {
    let start = index
        .checked_mul(usize::from(off_size))
        .ok_or(ParseError::BadIndex)?;
    let offset = ReadScope::new(offset_array)
        .offset(start)
        .ctxt()
        .read_offset(off_size)?;
    usize::try_from(offset).map_err(ParseError::from)
}

impl<T> ReadBinary for Dict<T>
where
    T: DictDefault,
{
    type HostType<'b> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let mut dict = Vec::new();
        let mut operands = Vec::new();

        while ctxt.bytes_available() {
            match Op::read(ctxt)? {
                Op::Operator(key) => match OPERATORS.get(&key) {
                    Some(info) if info.kind.accepts(operands.len()) => {
                        dict.push((info.operator, std::mem::take(&mut operands)));
                    }
                    Some(info) => {
                        warn!(
                            "ignoring {} with {} operand(s), expected {:?}",
                            info.name,
                            operands.len(),
                            info.kind
                        );
                        operands.clear();
                    }
                    None => {
                        warn!("ignoring unknown DICT operator {}", OperatorKey(key));
                        operands.clear();
                    }
                },
                Op::Operand(operand) => {
                    operands.push(operand);
                    if operands.len() == MAX_OPERANDS + 1 {
                        warn!("DICT entry has more than {} operands", MAX_OPERANDS);
                    }
                }
            }
        }

        Ok(Dict {
            dict,
            default: PhantomData,
        })
    }
}

struct OperatorKey(u16);

impl fmt::Display for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 >> 8 {
            12 => write!(f, "12 {}", self.0 & 0xFF),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl ReadBinary for Op {
    type HostType<'b> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let b0 = ctxt.read_u8()?;

        match b0 {
            0..=11 | 13..=21 => Ok(Op::Operator(u16::from(b0))),
            12 => Ok(Op::Operator(op2(ctxt.read_u8()?))),
            28 => {
                let num = ctxt.read_i16be()?;
                ok_int(i32::from(num))
            }
            29 => ok_int(ctxt.read_i32be()?),
            30 => ok_real(ctxt.read_until_nibble(END_OF_FLOAT_FLAG)?),
            32..=246 => ok_int(i32::from(b0) - 139),
            247..=250 => {
                let b1 = ctxt.read_u8()?;
                ok_int((i32::from(b0) - 247) * 256 + i32::from(b1) + 108)
            }
            251..=254 => {
                let b1 = ctxt.read_u8()?;
                ok_int(-(i32::from(b0) - 251) * 256 - i32::from(b1) - 108)
            }
            22..=27 | 31 | 255 => Err(ParseError::BadValue), // reserved
        }
    }
}

fn ok_int(num: i32) -> Result<Op, ParseError> {
    Ok(Op::Operand(Operand::Integer(num)))
}

fn ok_real(slice: &[u8]) -> Result<Op, ParseError> {
    Ok(Op::Operand(Operand::Real(Real(TinyVec::from(slice)))))
}

const FLOAT_BUF_LEN: usize = 64;

// Portions of this try_from impl derived from ttf-parser, licenced under Apache-2.0.
// https://github.com/RazrFalcon/ttf-parser/blob/ba2d9c8b9a207951b7b07e9481bc74688762bd21/src/tables/cff/dict.rs#L188
impl TryFrom<&Real> for f64 {
    type Error = ParseError;

    /// Try to parse this `Real` into an `f64`.
    fn try_from(real: &Real) -> Result<Self, Self::Error> {
        let mut buf = [0u8; FLOAT_BUF_LEN];
        let mut used = 0;

        for byte in real.0.iter() {
            let nibble1 = byte >> 4;
            let nibble2 = byte & 0xF;

            if nibble1 == END_OF_FLOAT_FLAG {
                break;
            }
            parse_float_nibble(nibble1, &mut used, &mut buf)?;
            if nibble2 == END_OF_FLOAT_FLAG {
                break;
            }
            parse_float_nibble(nibble2, &mut used, &mut buf)?;
        }

        // An exponent marker without any digits is an exponent of zero
        if buf[..used].ends_with(b"E") || buf[..used].ends_with(b"E-") {
            if used == FLOAT_BUF_LEN {
                return Err(ParseError::LimitExceeded);
            }
            buf[used] = b'0';
            used += 1;
        }

        if used == 0 {
            return Ok(0.);
        }

        let s = std::str::from_utf8(&buf[..used]).map_err(|_| ParseError::BadValue)?;
        s.parse().map_err(|_| ParseError::BadValue)
    }
}

impl TryFrom<Real> for f64 {
    type Error = ParseError;

    fn try_from(real: Real) -> Result<Self, Self::Error> {
        f64::try_from(&real)
    }
}

// Adobe Technical Note #5176, Table 5 Nibble Definitions
fn parse_float_nibble(nibble: u8, idx: &mut usize, data: &mut [u8]) -> Result<(), ParseError> {
    if *idx == FLOAT_BUF_LEN {
        return Err(ParseError::LimitExceeded);
    }

    match nibble {
        0..=9 => {
            data[*idx] = b'0' + nibble;
        }
        10 => {
            data[*idx] = b'.';
        }
        11 => {
            data[*idx] = b'E';
        }
        12 => {
            if *idx + 1 == FLOAT_BUF_LEN {
                return Err(ParseError::LimitExceeded);
            }

            data[*idx] = b'E';
            *idx += 1;
            data[*idx] = b'-';
        }
        // reserved
        13 => return Ok(()),
        14 => {
            data[*idx] = b'-';
        }
        _ => return Err(ParseError::BadValue),
    }

    *idx += 1;
    Ok(())
}

impl ReadFrom for Range<u8, u8> {
    type ReadType = (U8, U8);
    fn read_from((first, n_left): (u8, u8)) -> Self {
        Range { first, n_left }
    }
}

impl ReadFrom for Range<SID, u8> {
    type ReadType = (U16Be, U8);
    fn read_from((first, n_left): (SID, u8)) -> Self {
        Range { first, n_left }
    }
}

impl ReadFrom for Range<SID, u16> {
    type ReadType = (U16Be, U16Be);
    fn read_from((first, n_left): (SID, u16)) -> Self {
        Range { first, n_left }
    }
}

impl ReadFrom for FDRange {
    type ReadType = (U16Be, U8);
    fn read_from((first, fd_index): (u16, u8)) -> Self {
        FDRange { first, fd_index }
    }
}

impl ReadFrom for EncodingSupplement {
    type ReadType = (U8, U16Be);
    fn read_from((code, sid): (u8, SID)) -> Self {
        EncodingSupplement { code, sid }
    }
}

impl<F, N> Range<F, N>
where
    N: num::Unsigned + Copy,
    usize: From<N>,
{
    pub fn len(&self) -> usize {
        usize::from(self.n_left) + 1
    }
}

// TODO: Make these generic. Requires Rust stabilisation of the Step trait or its replacement.
// https://doc.rust-lang.org/core/iter/trait.Step.html
impl Range<SID, u8> {
    pub fn iter(&self) -> impl Iterator<Item = SID> {
        let last = self.first.saturating_add(SID::from(self.n_left));
        self.first..=last
    }
}

impl Range<SID, u16> {
    pub fn iter(&self) -> impl Iterator<Item = SID> {
        let last = self.first.saturating_add(self.n_left);
        self.first..=last
    }
}

impl<'a> CustomEncoding<'a> {
    pub fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, CFFError> {
        // First byte indicates the format of the encoding data
        let format = ctxt.read::<U8>()?;
        let codes = match format & 0x7F {
            0 => {
                let ncodes = ctxt.read::<U8>()?;
                let codes = ctxt.read_array::<U8>(usize::from(ncodes))?;
                EncodingCodes::Format0 { codes }
            }
            1 => {
                let nranges = ctxt.read::<U8>()?;
                let ranges = ctxt.read_array::<Range<u8, u8>>(usize::from(nranges))?;
                EncodingCodes::Format1 { ranges }
            }
            _ => return Err(CFFError::UnsupportedEncodingFormat(format)),
        };

        // The CFF spec notes:
        // A few fonts have multiply-encoded glyphs which are not supported directly by any of
        // the above formats. This situation is indicated by setting the high-order bit in the
        // format byte and supplementing the encoding.
        let supplements = if format & 0x80 == 0x80 {
            let nsups = ctxt.read::<U8>()?;
            ctxt.read_array::<EncodingSupplement>(usize::from(nsups))?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(CustomEncoding { codes, supplements })
    }
}

impl<'a> Charset<'a> {
    /// Returns the id of the SID (Type 1 font) or CID (CID keyed font) of the name of the supplied glyph
    pub fn id_for_glyph(&self, glyph_id: u16) -> Option<u16> {
        match self {
            // In ISOAdobe glyph ID maps to SID
            Charset::ISOAdobe => {
                if glyph_id <= ISO_ADOBE_LAST_SID {
                    Some(glyph_id)
                } else {
                    None
                }
            }
            Charset::Expert => EXPERT_CHARSET.get(usize::from(glyph_id)).cloned(),
            Charset::ExpertSubset => EXPERT_SUBSET_CHARSET.get(usize::from(glyph_id)).cloned(),
            Charset::Custom(custom) => custom.id_for_glyph(glyph_id),
        }
    }

    /// Returns the SID or CID of each of the first `n_glyphs` glyphs.
    fn glyph_ids(&self, n_glyphs: usize) -> Vec<Option<u16>> {
        match self {
            Charset::Custom(custom) => custom
                .iter()
                .map(Some)
                .chain(iter::repeat(None))
                .take(n_glyphs)
                .collect(),
            _ => (0..n_glyphs)
                .map(|glyph_id| {
                    u16::try_from(glyph_id)
                        .ok()
                        .and_then(|glyph_id| self.id_for_glyph(glyph_id))
                })
                .collect(),
        }
    }
}

impl<'a> CustomCharset<'a> {
    pub fn read(ctxt: &mut ReadCtxt<'a>, n_glyphs: usize) -> Result<Self, CFFError> {
        // (There is one less element in the charset than nGlyphs because the .notdef glyph name is omitted.)
        let n_glyphs = n_glyphs.checked_sub(1).ok_or(ParseError::BadValue)?;
        match ctxt.read::<U8>()? {
            0 => {
                // The number of glyphs (nGlyphs) is the value of the count field in the
                // CharStrings INDEX.
                let glyphs = ctxt.read_array::<U16Be>(n_glyphs)?;
                Ok(CustomCharset::Format0 { glyphs })
            }
            1 => {
                let ranges = read_range_array(ctxt, n_glyphs)?;
                Ok(CustomCharset::Format1 { ranges })
            }
            2 => {
                let ranges = read_range_array(ctxt, n_glyphs)?;
                Ok(CustomCharset::Format2 { ranges })
            }
            format => Err(CFFError::UnsupportedCharsetFormat(format)),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u16> + '_> {
        let notdef = iter::once(0);
        match &self {
            CustomCharset::Format0 { glyphs } => Box::new(notdef.chain(glyphs.iter())),
            CustomCharset::Format1 { ranges } => {
                Box::new(notdef.chain(ranges.iter().flat_map(|range| range.iter())))
            }
            CustomCharset::Format2 { ranges } => {
                Box::new(notdef.chain(ranges.iter().flat_map(|range| range.iter())))
            }
        }
    }

    /// Returns the SID (Type 1 font) or CID (CID keyed font) of the name of the supplied glyph
    pub fn id_for_glyph(&self, glyph_id: u16) -> Option<u16> {
        // Section 11 of Technical Note #5176:
        // By definition the first glyph (GID 0) is “.notdef” and must be present in all fonts.
        // Since this is always the case, it is not necessary to represent either the encoding
        // (unencoded) or name (.notdef) for GID 0. Consequently, taking advantage of this
        // optimization, the encoding and charset arrays always begin with GID 1.
        if glyph_id == 0 {
            return Some(0);
        }

        match self {
            CustomCharset::Format0 { glyphs } => glyphs.get_item(usize::from(glyph_id - 1)),
            CustomCharset::Format1 { ranges } => Self::id_for_glyph_in_ranges(ranges, glyph_id),
            CustomCharset::Format2 { ranges } => Self::id_for_glyph_in_ranges(ranges, glyph_id),
        }
    }

    fn id_for_glyph_in_ranges<F, N>(
        ranges: &ReadArray<'a, Range<F, N>>,
        glyph_id: u16,
    ) -> Option<u16>
    where
        F: num::Unsigned + Copy,
        N: num::Unsigned + Copy,
        usize: From<N> + From<F>,
        Range<F, N>: ReadFrom,
    {
        let glyph_id = usize::from(glyph_id);

        ranges
            .iter()
            .scan(0usize, |glyphs_covered, range| {
                *glyphs_covered += range.len();
                Some((*glyphs_covered, range))
            })
            .find(|(glyphs_covered, _range)| glyph_id <= *glyphs_covered)
            .and_then(|(glyphs_covered, range)| {
                u16::try_from(
                    usize::from(range.first) + (glyph_id - (glyphs_covered - range.len()) - 1),
                )
                .ok()
            })
    }
}

fn read_range_array<'a, F, N>(
    ctxt: &mut ReadCtxt<'a>,
    n_glyphs: usize,
) -> Result<ReadArray<'a, Range<F, N>>, ParseError>
where
    Range<F, N>: ReadFrom,
    usize: From<N>,
    N: num::Unsigned + Copy,
{
    let mut peek = ctxt.scope().ctxt();
    let mut range_count = 0;
    let mut glyphs_covered = 0;
    while glyphs_covered < n_glyphs {
        let range = peek.read::<Range<F, N>>()?;
        range_count += 1;
        glyphs_covered += range.len();
    }

    ctxt.read_array::<Range<F, N>>(range_count)
}

impl FDSelect {
    pub fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, CFFError> {
        match ctxt.read::<U8>()? {
            3 => {
                let nranges = usize::from(ctxt.read::<U16Be>()?);
                let ranges = ctxt.read_array::<FDRange>(nranges)?.to_vec();
                let sentinel = ctxt.read::<U16Be>()?;
                Ok(FDSelect { ranges, sentinel })
            }
            format => Err(CFFError::UnsupportedFDSelectFormat(format)),
        }
    }

    pub fn range_provider(&self) -> FDRangeProvider<'_> {
        FDRangeProvider {
            ranges: &self.ranges,
            sentinel: self.sentinel,
            current: 0,
        }
    }
}

impl<'a> FDRangeProvider<'a> {
    /// Returns the Font DICT index of `glyph_id`.
    ///
    /// Advances to the next range at most once per call.
    pub fn select_for_glyph(&mut self, glyph_id: u16) -> Result<u8, CFFError> {
        if let Some(fd_index) = self.lookup(self.current, glyph_id) {
            return Ok(fd_index);
        }

        self.current += 1;
        self.lookup(self.current, glyph_id)
            .ok_or(CFFError::GlyphOutsideFDRanges(glyph_id))
    }

    fn lookup(&self, index: usize, glyph_id: u16) -> Option<u8> {
        let range = self.ranges.get(index)?;
        let upper_bound = self
            .ranges
            .get(index + 1)
            .map_or(self.sentinel, |next| next.first);
        (range.first <= glyph_id && glyph_id < upper_bound).then_some(range.fd_index)
    }
}

impl DictDefault for TopDictDefault {
    fn default(op: Operator) -> Option<&'static [Operand]> {
        match op {
            Operator::IsFixedPitch => Some(&OPERAND_ZERO),
            Operator::ItalicAngle => Some(&OPERAND_ZERO),
            Operator::UnderlinePosition => Some(&DEFAULT_UNDERLINE_POSITION),
            Operator::UnderlineThickness => Some(&DEFAULT_UNDERLINE_THICKNESS),
            Operator::PaintType => Some(&OPERAND_ZERO),
            Operator::CharstringType => Some(&DEFAULT_CHARSTRING_TYPE),
            Operator::FontMatrix => Some(DEFAULT_FONT_MATRIX.as_ref()),
            Operator::FontBBox => Some(&DEFAULT_BBOX),
            Operator::StrokeWidth => Some(&OPERAND_ZERO),
            Operator::Charset => Some(&OPERAND_ZERO),
            Operator::Encoding => Some(&OPERAND_ZERO),
            Operator::CIDFontVersion => Some(&OPERAND_ZERO),
            Operator::CIDFontRevision => Some(&OPERAND_ZERO),
            Operator::CIDFontType => Some(&OPERAND_ZERO),
            Operator::CIDCount => Some(&DEFAULT_CID_COUNT),
            _ => None,
        }
    }
}

impl DictDefault for FontDictDefault {
    fn default(_op: Operator) -> Option<&'static [Operand]> {
        None
    }
}

impl DictDefault for PrivateDictDefault {
    fn default(op: Operator) -> Option<&'static [Operand]> {
        match op {
            Operator::BlueScale => Some(DEFAULT_BLUE_SCALE.as_ref()),
            Operator::BlueShift => Some(&DEFAULT_BLUE_SHIFT),
            Operator::BlueFuzz => Some(&DEFAULT_BLUE_FUZZ),
            Operator::ForceBold => Some(&OPERAND_ZERO),
            Operator::LanguageGroup => Some(&OPERAND_ZERO),
            Operator::ExpansionFactor => Some(DEFAULT_EXPANSION_FACTOR.as_ref()),
            Operator::InitialRandomSeed => Some(&OPERAND_ZERO),
            Operator::StrokeWidth => Some(&OPERAND_ZERO),
            Operator::DefaultWidthX => Some(&OPERAND_ZERO),
            Operator::NominalWidthX => Some(&OPERAND_ZERO),
            _ => None,
        }
    }
}

impl<T> Dict<T>
where
    T: DictDefault,
{
    pub fn new() -> Self {
        Dict {
            dict: Vec::new(),
            default: PhantomData,
        }
    }

    pub fn get_with_default(&self, key: Operator) -> Option<&[Operand]> {
        self.get(key).or_else(|| T::default(key))
    }

    pub fn get(&self, key: Operator) -> Option<&[Operand]> {
        self.dict.iter().find_map(|(op, args)| {
            if *op == key {
                Some(args.as_slice())
            } else {
                None
            }
        })
    }

    /// Returns the i32 value of this operator if the operands hold a single Integer.
    pub fn get_i32(&self, key: Operator) -> Option<Result<i32, ParseError>> {
        self.get_with_default(key).map(|operands| match operands {
            [Operand::Integer(number)] => Ok(*number),
            _ => Err(ParseError::BadValue),
        })
    }

    /// Returns the value of this operator if the operands hold a single number.
    pub fn get_f64(&self, key: Operator) -> Option<Result<f64, ParseError>> {
        self.get_with_default(key).map(|operands| match operands {
            [operand] => operand.to_f64(),
            _ => Err(ParseError::BadValue),
        })
    }

    /// Returns the SID operand of this operator.
    pub fn get_sid(&self, key: Operator) -> Option<SID> {
        match self.get_with_default(key)? {
            [operand] => operand.to_sid().ok(),
            _ => None,
        }
    }

    /// Returns the absolute values of a delta encoded array operand.
    pub fn get_delta(&self, key: Operator) -> Option<Result<Vec<f64>, ParseError>> {
        self.get_with_default(key).map(|operands| {
            let mut value = 0.;
            operands
                .iter()
                .map(|operand| {
                    value += operand.to_f64()?;
                    Ok(value)
                })
                .collect()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Operator, Vec<Operand>)> {
        self.dict.iter()
    }

    /// Returns the size and offset of the Private DICT if this DICT has a Private operator.
    pub fn private_dict_range(&self) -> Result<Option<(usize, usize)>, ParseError> {
        match self.get(Operator::Private) {
            Some([Operand::Integer(length), Operand::Integer(offset)]) => {
                Ok(Some((to_offset(*length)?, to_offset(*offset)?)))
            }
            Some(_) => Err(ParseError::BadValue),
            None => Ok(None),
        }
    }

    /// Read a PrivateDict from this Dict returning it and its offset within `scope` on success.
    ///
    /// A Private DICT may be specified as having a length of 0 if there are no non-default
    /// values to be stored.
    pub fn read_private_dict<'a>(
        &self,
        scope: &ReadScope<'a>,
    ) -> Result<Option<(PrivateDict, usize)>, ParseError> {
        let (length, offset) = match self.private_dict_range()? {
            Some(range) => range,
            None => return Ok(None),
        };
        let private_dict = match length {
            0 => PrivateDict::new(),
            _ => scope.offset_length(offset, length)?.read::<PrivateDict>()?,
        };
        Ok(Some((private_dict, offset)))
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }
}

impl<T: DictDefault> Default for Dict<T> {
    fn default() -> Self {
        Dict::new()
    }
}

impl Operand {
    pub fn to_f64(&self) -> Result<f64, ParseError> {
        match self {
            Operand::Integer(number) => Ok(f64::from(*number)),
            Operand::Real(real) => f64::try_from(real),
        }
    }

    fn to_sid(&self) -> Result<SID, ParseError> {
        match self {
            Operand::Integer(number) => SID::try_from(*number).map_err(ParseError::from),
            Operand::Real(_) => Err(ParseError::BadValue),
        }
    }
}

impl Operator {
    /// Look up the registry entry for an operator key as it appears in a DICT.
    ///
    /// Two byte operators have the escape byte (12) in the high byte.
    pub fn lookup(key: u16) -> Option<&'static OperatorInfo> {
        OPERATORS.get(&key)
    }

    pub fn name(self) -> &'static str {
        Operator::lookup(self as u16).map_or("unknown", |info| info.name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OperandKind {
    fn accepts(self, count: usize) -> bool {
        match self {
            OperandKind::Sid | OperandKind::Boolean | OperandKind::Number => count == 1,
            OperandKind::NumberNumber => count == 2,
            OperandKind::SidSidNumber => count == 3,
            OperandKind::Array | OperandKind::Delta => true,
        }
    }
}

impl GlyphData {
    pub fn new(name: Option<String>, sid: u16, instructions: Vec<Instruction>, compacted: bool) -> Self {
        GlyphData {
            name,
            sid,
            instructions: instructions.into_boxed_slice(),
            compacted,
        }
    }

    /// The instructions as stored, compacted if [GlyphData::is_compacted].
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_compacted(&self) -> bool {
        self.compacted
    }

    /// The instructions with any compaction undone.
    pub fn expanded_instructions(&self) -> Cow<'_, [Instruction]> {
        match self.compacted {
            true => Cow::Owned(compact::expand(&self.instructions)),
            false => Cow::Borrowed(&self.instructions),
        }
    }

    /// The advance width of the glyph relative to nominalWidthX, if the charstring holds one.
    pub fn width_delta(&self) -> Option<i32> {
        // The width is always the first instruction and is never merged by compaction
        self.instructions
            .first()
            .filter(|instruction| instruction.op == Type2Op::GlyphWidth)
            .map(|instruction| instruction.value)
    }
}

impl<'a> Font<'a> {
    pub fn is_cid_keyed(&self) -> bool {
        self.cid.is_some()
    }

    pub fn glyph(&self, glyph_id: u16) -> Option<&Glyph> {
        self.glyphs.get(usize::from(glyph_id))
    }

    pub fn glyph_by_name(&self, name: &str) -> Option<&Glyph> {
        self.glyphs
            .iter()
            .find(|glyph| glyph.data.name.as_deref() == Some(name))
    }

    /// Iterate over the glyph id and name of each glyph that has a name.
    pub fn glyph_names(&self) -> impl Iterator<Item = (u16, &str)> + '_ {
        self.glyphs
            .iter()
            .filter_map(|glyph| Some((glyph.glyph_index, glyph.data.name.as_deref()?)))
    }

    /// The advance width of a glyph in font units.
    ///
    /// A charstring without a width uses defaultWidthX, otherwise the width is relative to
    /// nominalWidthX. CID-keyed fonts take both from the glyph's Font DICT.
    pub fn advance_width(&self, glyph_id: u16) -> Option<f64> {
        let glyph = self.glyph(glyph_id)?;
        let (default_width_x, nominal_width_x) = match glyph.font_dict_index {
            Some(index) => {
                let font_dict = self.font_dicts.get(usize::from(index))?;
                (font_dict.default_width_x, font_dict.nominal_width_x)
            }
            None => (self.default_width_x, self.nominal_width_x),
        };
        Some(match glyph.data.width_delta() {
            Some(delta) => nominal_width_x + f64::from(delta),
            None => default_width_x,
        })
    }

    /// Evaluate the outline of a glyph into `sink`, scaling coordinates by `scale`.
    pub fn visit_glyph<S: OutlineSink>(
        &self,
        glyph_id: u16,
        evaluator: &mut Evaluator,
        sink: &mut S,
        scale: f32,
    ) -> Result<(), CFFError> {
        let glyph = self.glyph(glyph_id).ok_or(ParseError::BadIndex)?;
        evaluator.evaluate(glyph.data.instructions(), sink, scale)
    }
}

impl From<ParseError> for CFFError {
    fn from(error: ParseError) -> CFFError {
        CFFError::ParseError(error)
    }
}

impl From<ReadEof> for CFFError {
    fn from(error: ReadEof) -> CFFError {
        CFFError::ParseError(ParseError::from(error))
    }
}

impl fmt::Display for CFFError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CFFError::ParseError(parse_error) => {
                write!(f, "parse error: ")?;
                parse_error.fmt(f)
            }
            CFFError::MultipleFonts => write!(f, "font sets with more than one font"),
            CFFError::MultipleTopDicts => write!(f, "more than one Top DICT"),
            CFFError::UnsupportedVersion(major) => write!(f, "unsupported CFF version {}", major),
            CFFError::UnsupportedCharsetFormat(format) => {
                write!(f, "unsupported charset format {}", format)
            }
            CFFError::UnsupportedEncodingFormat(format) => {
                write!(f, "unsupported encoding format {}", format)
            }
            CFFError::UnsupportedFDSelectFormat(format) => {
                write!(f, "unsupported FDSelect format {}", format)
            }
            CFFError::InvalidOperator => write!(f, "an invalid operator occurred"),
            CFFError::HintMaskOverrun => write!(f, "hint mask extends past the end of data"),
            CFFError::GlyphOutsideFDRanges(glyph_id) => {
                write!(f, "glyph {} is not covered by FDSelect", glyph_id)
            }
            CFFError::InvalidSubroutineCall => write!(f, "subroutine number is not an integer"),
            CFFError::InvalidSubroutineIndex => write!(f, "an invalid subroutine index"),
            CFFError::NoLocalSubroutines => write!(f, "no local subroutines"),
            CFFError::NestingLimitReached => write!(f, "subroutines nesting limit reached"),
            CFFError::UnexpectedSubroutineCall => {
                write!(f, "subroutine call found in decoded instructions")
            }
            CFFError::InvalidArgumentsStackLength => {
                write!(f, "an invalid amount of items are in an arguments stack")
            }
            CFFError::ArgumentsStackLimitReached => write!(f, "arguments stack limit reached"),
            CFFError::InvalidWidth => write!(f, "glyph width is not an integer"),
        }
    }
}

impl std::error::Error for CFFError {}

const STANDARD_STRINGS: [&str; 391] = [
    ".notdef",
    "space",
    "exclam",
    "quotedbl",
    "numbersign",
    "dollar",
    "percent",
    "ampersand",
    "quoteright",
    "parenleft",
    "parenright",
    "asterisk",
    "plus",
    "comma",
    "hyphen",
    "period",
    "slash",
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "colon",
    "semicolon",
    "less",
    "equal",
    "greater",
    "question",
    "at",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "H",
    "I",
    "J",
    "K",
    "L",
    "M",
    "N",
    "O",
    "P",
    "Q",
    "R",
    "S",
    "T",
    "U",
    "V",
    "W",
    "X",
    "Y",
    "Z",
    "bracketleft",
    "backslash",
    "bracketright",
    "asciicircum",
    "underscore",
    "quoteleft",
    "a",
    "b",
    "c",
    "d",
    "e",
    "f",
    "g",
    "h",
    "i",
    "j",
    "k",
    "l",
    "m",
    "n",
    "o",
    "p",
    "q",
    "r",
    "s",
    "t",
    "u",
    "v",
    "w",
    "x",
    "y",
    "z",
    "braceleft",
    "bar",
    "braceright",
    "asciitilde",
    "exclamdown",
    "cent",
    "sterling",
    "fraction",
    "yen",
    "florin",
    "section",
    "currency",
    "quotesingle",
    "quotedblleft",
    "guillemotleft",
    "guilsinglleft",
    "guilsinglright",
    "fi",
    "fl",
    "endash",
    "dagger",
    "daggerdbl",
    "periodcentered",
    "paragraph",
    "bullet",
    "quotesinglbase",
    "quotedblbase",
    "quotedblright",
    "guillemotright",
    "ellipsis",
    "perthousand",
    "questiondown",
    "grave",
    "acute",
    "circumflex",
    "tilde",
    "macron",
    "breve",
    "dotaccent",
    "dieresis",
    "ring",
    "cedilla",
    "hungarumlaut",
    "ogonek",
    "caron",
    "emdash",
    "AE",
    "ordfeminine",
    "Lslash",
    "Oslash",
    "OE",
    "ordmasculine",
    "ae",
    "dotlessi",
    "lslash",
    "oslash",
    "oe",
    "germandbls",
    "onesuperior",
    "logicalnot",
    "mu",
    "trademark",
    "Eth",
    "onehalf",
    "plusminus",
    "Thorn",
    "onequarter",
    "divide",
    "brokenbar",
    "degree",
    "thorn",
    "threequarters",
    "twosuperior",
    "registered",
    "minus",
    "eth",
    "multiply",
    "threesuperior",
    "copyright",
    "Aacute",
    "Acircumflex",
    "Adieresis",
    "Agrave",
    "Aring",
    "Atilde",
    "Ccedilla",
    "Eacute",
    "Ecircumflex",
    "Edieresis",
    "Egrave",
    "Iacute",
    "Icircumflex",
    "Idieresis",
    "Igrave",
    "Ntilde",
    "Oacute",
    "Ocircumflex",
    "Odieresis",
    "Ograve",
    "Otilde",
    "Scaron",
    "Uacute",
    "Ucircumflex",
    "Udieresis",
    "Ugrave",
    "Yacute",
    "Ydieresis",
    "Zcaron",
    "aacute",
    "acircumflex",
    "adieresis",
    "agrave",
    "aring",
    "atilde",
    "ccedilla",
    "eacute",
    "ecircumflex",
    "edieresis",
    "egrave",
    "iacute",
    "icircumflex",
    "idieresis",
    "igrave",
    "ntilde",
    "oacute",
    "ocircumflex",
    "odieresis",
    "ograve",
    "otilde",
    "scaron",
    "uacute",
    "ucircumflex",
    "udieresis",
    "ugrave",
    "yacute",
    "ydieresis",
    "zcaron",
    "exclamsmall",
    "Hungarumlautsmall",
    "dollaroldstyle",
    "dollarsuperior",
    "ampersandsmall",
    "Acutesmall",
    "parenleftsuperior",
    "parenrightsuperior",
    "twodotenleader",
    "onedotenleader",
    "zerooldstyle",
    "oneoldstyle",
    "twooldstyle",
    "threeoldstyle",
    "fouroldstyle",
    "fiveoldstyle",
    "sixoldstyle",
    "sevenoldstyle",
    "eightoldstyle",
    "nineoldstyle",
    "commasuperior",
    "threequartersemdash",
    "periodsuperior",
    "questionsmall",
    "asuperior",
    "bsuperior",
    "centsuperior",
    "dsuperior",
    "esuperior",
    "isuperior",
    "lsuperior",
    "msuperior",
    "nsuperior",
    "osuperior",
    "rsuperior",
    "ssuperior",
    "tsuperior",
    "ff",
    "ffi",
    "ffl",
    "parenleftinferior",
    "parenrightinferior",
    "Circumflexsmall",
    "hyphensuperior",
    "Gravesmall",
    "Asmall",
    "Bsmall",
    "Csmall",
    "Dsmall",
    "Esmall",
    "Fsmall",
    "Gsmall",
    "Hsmall",
    "Ismall",
    "Jsmall",
    "Ksmall",
    "Lsmall",
    "Msmall",
    "Nsmall",
    "Osmall",
    "Psmall",
    "Qsmall",
    "Rsmall",
    "Ssmall",
    "Tsmall",
    "Usmall",
    "Vsmall",
    "Wsmall",
    "Xsmall",
    "Ysmall",
    "Zsmall",
    "colonmonetary",
    "onefitted",
    "rupiah",
    "Tildesmall",
    "exclamdownsmall",
    "centoldstyle",
    "Lslashsmall",
    "Scaronsmall",
    "Zcaronsmall",
    "Dieresissmall",
    "Brevesmall",
    "Caronsmall",
    "Dotaccentsmall",
    "Macronsmall",
    "figuredash",
    "hypheninferior",
    "Ogoneksmall",
    "Ringsmall",
    "Cedillasmall",
    "questiondownsmall",
    "oneeighth",
    "threeeighths",
    "fiveeighths",
    "seveneighths",
    "onethird",
    "twothirds",
    "zerosuperior",
    "foursuperior",
    "fivesuperior",
    "sixsuperior",
    "sevensuperior",
    "eightsuperior",
    "ninesuperior",
    "zeroinferior",
    "oneinferior",
    "twoinferior",
    "threeinferior",
    "fourinferior",
    "fiveinferior",
    "sixinferior",
    "seveninferior",
    "eightinferior",
    "nineinferior",
    "centinferior",
    "dollarinferior",
    "periodinferior",
    "commainferior",
    "Agravesmall",
    "Aacutesmall",
    "Acircumflexsmall",
    "Atildesmall",
    "Adieresissmall",
    "Aringsmall",
    "AEsmall",
    "Ccedillasmall",
    "Egravesmall",
    "Eacutesmall",
    "Ecircumflexsmall",
    "Edieresissmall",
    "Igravesmall",
    "Iacutesmall",
    "Icircumflexsmall",
    "Idieresissmall",
    "Ethsmall",
    "Ntildesmall",
    "Ogravesmall",
    "Oacutesmall",
    "Ocircumflexsmall",
    "Otildesmall",
    "Odieresissmall",
    "OEsmall",
    "Oslashsmall",
    "Ugravesmall",
    "Uacutesmall",
    "Ucircumflexsmall",
    "Udieresissmall",
    "Yacutesmall",
    "Thornsmall",
    "Ydieresissmall",
    "001.000",
    "001.001",
    "001.002",
    "001.003",
    "Black",
    "Bold",
    "Book",
    "Light",
    "Medium",
    "Regular",
    "Roman",
    "Semibold",
];

const EXPERT_CHARSET: [u16; 166] = [
    0,   // .notdef
    1,   // space
    229, // exclamsmall
    230, // Hungarumlautsmall
    231, // dollaroldstyle
    232, // dollarsuperior
    233, // ampersandsmall
    234, // Acutesmall
    235, // parenleftsuperior
    236, // parenrightsuperior
    237, // twodotenleader
    238, // onedotenleader
    13,  // comma
    14,  // hyphen
    15,  // period
    99,  // fraction
    239, // zerooldstyle
    240, // oneoldstyle
    241, // twooldstyle
    242, // threeoldstyle
    243, // fouroldstyle
    244, // fiveoldstyle
    245, // sixoldstyle
    246, // sevenoldstyle
    247, // eightoldstyle
    248, // nineoldstyle
    27,  // colon
    28,  // semicolon
    249, // commasuperior
    250, // threequartersemdash
    251, // periodsuperior
    252, // questionsmall
    253, // asuperior
    254, // bsuperior
    255, // centsuperior
    256, // dsuperior
    257, // esuperior
    258, // isuperior
    259, // lsuperior
    260, // msuperior
    261, // nsuperior
    262, // osuperior
    263, // rsuperior
    264, // ssuperior
    265, // tsuperior
    266, // ff
    109, // fi
    110, // fl
    267, // ffi
    268, // ffl
    269, // parenleftinferior
    270, // parenrightinferior
    271, // Circumflexsmall
    272, // hyphensuperior
    273, // Gravesmall
    274, // Asmall
    275, // Bsmall
    276, // Csmall
    277, // Dsmall
    278, // Esmall
    279, // Fsmall
    280, // Gsmall
    281, // Hsmall
    282, // Ismall
    283, // Jsmall
    284, // Ksmall
    285, // Lsmall
    286, // Msmall
    287, // Nsmall
    288, // Osmall
    289, // Psmall
    290, // Qsmall
    291, // Rsmall
    292, // Ssmall
    293, // Tsmall
    294, // Usmall
    295, // Vsmall
    296, // Wsmall
    297, // Xsmall
    298, // Ysmall
    299, // Zsmall
    300, // colonmonetary
    301, // onefitted
    302, // rupiah
    303, // Tildesmall
    304, // exclamdownsmall
    305, // centoldstyle
    306, // Lslashsmall
    307, // Scaronsmall
    308, // Zcaronsmall
    309, // Dieresissmall
    310, // Brevesmall
    311, // Caronsmall
    312, // Dotaccentsmall
    313, // Macronsmall
    314, // figuredash
    315, // hypheninferior
    316, // Ogoneksmall
    317, // Ringsmall
    318, // Cedillasmall
    158, // onequarter
    155, // onehalf
    163, // threequarters
    319, // questiondownsmall
    320, // oneeighth
    321, // threeeighths
    322, // fiveeighths
    323, // seveneighths
    324, // onethird
    325, // twothirds
    326, // zerosuperior
    150, // onesuperior
    164, // twosuperior
    169, // threesuperior
    327, // foursuperior
    328, // fivesuperior
    329, // sixsuperior
    330, // sevensuperior
    331, // eightsuperior
    332, // ninesuperior
    333, // zeroinferior
    334, // oneinferior
    335, // twoinferior
    336, // threeinferior
    337, // fourinferior
    338, // fiveinferior
    339, // sixinferior
    340, // seveninferior
    341, // eightinferior
    342, // nineinferior
    343, // centinferior
    344, // dollarinferior
    345, // periodinferior
    346, // commainferior
    347, // Agravesmall
    348, // Aacutesmall
    349, // Acircumflexsmall
    350, // Atildesmall
    351, // Adieresissmall
    352, // Aringsmall
    353, // AEsmall
    354, // Ccedillasmall
    355, // Egravesmall
    356, // Eacutesmall
    357, // Ecircumflexsmall
    358, // Edieresissmall
    359, // Igravesmall
    360, // Iacutesmall
    361, // Icircumflexsmall
    362, // Idieresissmall
    363, // Ethsmall
    364, // Ntildesmall
    365, // Ogravesmall
    366, // Oacutesmall
    367, // Ocircumflexsmall
    368, // Otildesmall
    369, // Odieresissmall
    370, // OEsmall
    371, // Oslashsmall
    372, // Ugravesmall
    373, // Uacutesmall
    374, // Ucircumflexsmall
    375, // Udieresissmall
    376, // Yacutesmall
    377, // Thornsmall
    378, // Ydieresissmall
];

const EXPERT_SUBSET_CHARSET: [u16; 87] = [
    0,   // .notdef
    1,   // space
    231, // dollaroldstyle
    232, // dollarsuperior
    235, // parenleftsuperior
    236, // parenrightsuperior
    237, // twodotenleader
    238, // onedotenleader
    13,  // comma
    14,  // hyphen
    15,  // period
    99,  // fraction
    239, // zerooldstyle
    240, // oneoldstyle
    241, // twooldstyle
    242, // threeoldstyle
    243, // fouroldstyle
    244, // fiveoldstyle
    245, // sixoldstyle
    246, // sevenoldstyle
    247, // eightoldstyle
    248, // nineoldstyle
    27,  // colon
    28,  // semicolon
    249, // commasuperior
    250, // threequartersemdash
    251, // periodsuperior
    253, // asuperior
    254, // bsuperior
    255, // centsuperior
    256, // dsuperior
    257, // esuperior
    258, // isuperior
    259, // lsuperior
    260, // msuperior
    261, // nsuperior
    262, // osuperior
    263, // rsuperior
    264, // ssuperior
    265, // tsuperior
    266, // ff
    109, // fi
    110, // fl
    267, // ffi
    268, // ffl
    269, // parenleftinferior
    270, // parenrightinferior
    272, // hyphensuperior
    300, // colonmonetary
    301, // onefitted
    302, // rupiah
    305, // centoldstyle
    314, // figuredash
    315, // hypheninferior
    158, // onequarter
    155, // onehalf
    163, // threequarters
    320, // oneeighth
    321, // threeeighths
    322, // fiveeighths
    323, // seveneighths
    324, // onethird
    325, // twothirds
    326, // zerosuperior
    150, // onesuperior
    164, // twosuperior
    169, // threesuperior
    327, // foursuperior
    328, // fivesuperior
    329, // sixsuperior
    330, // sevensuperior
    331, // eightsuperior
    332, // ninesuperior
    333, // zeroinferior
    334, // oneinferior
    335, // twoinferior
    336, // threeinferior
    337, // fourinferior
    338, // fiveinferior
    339, // sixinferior
    340, // seveninferior
    341, // eightinferior
    342, // nineinferior
    343, // centinferior
    344, // dollarinferior
    345, // periodinferior
    346, // commainferior
];

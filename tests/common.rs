#[allow(dead_code)]
pub mod writer {
    //! Testing utilities for building CFF data.

    // The writer module is derived from ttf-parser, licenced under Apache-2.0.
    // https://github.com/RazrFalcon/ttf-parser/blob/439aaaebd50eb8aed66302e3c1b51fae047f85b2/src/writer.rs

    #[allow(missing_debug_implementations)]
    #[derive(Clone, Copy)]
    pub enum TtfType {
        Raw(&'static [u8]),
        Int8(i8),
        UInt8(u8),
        Int16(i16),
        UInt16(u16),
        Int32(i32),
        UInt32(u32),
        /// An integer operand in its shortest encoding.
        CFFInt(i32),
        /// An integer operand always encoded in 5 bytes, used for offsets.
        CFFInt32(i32),
        /// A one byte DICT or charstring operator.
        Op(u8),
        /// A two byte DICT or charstring operator.
        Op2(u8),
    }

    pub fn convert(values: &[TtfType]) -> Vec<u8> {
        let mut data = Vec::with_capacity(256);
        for v in values {
            convert_type(*v, &mut data);
        }

        data
    }

    pub fn convert_type(value: TtfType, data: &mut Vec<u8>) {
        match value {
            TtfType::Raw(bytes) => {
                data.extend_from_slice(bytes);
            }
            TtfType::Int8(n) => {
                data.extend_from_slice(&i8::to_be_bytes(n));
            }
            TtfType::UInt8(n) => {
                data.extend_from_slice(&u8::to_be_bytes(n));
            }
            TtfType::Int16(n) => {
                data.extend_from_slice(&i16::to_be_bytes(n));
            }
            TtfType::UInt16(n) => {
                data.extend_from_slice(&u16::to_be_bytes(n));
            }
            TtfType::Int32(n) => {
                data.extend_from_slice(&i32::to_be_bytes(n));
            }
            TtfType::UInt32(n) => {
                data.extend_from_slice(&u32::to_be_bytes(n));
            }
            TtfType::CFFInt(n) => match n {
                -107..=107 => {
                    data.push((n as i16 + 139) as u8);
                }
                108..=1131 => {
                    let n = n - 108;
                    data.push(((n >> 8) + 247) as u8);
                    data.push((n & 0xFF) as u8);
                }
                -1131..=-108 => {
                    let n = -n - 108;
                    data.push(((n >> 8) + 251) as u8);
                    data.push((n & 0xFF) as u8);
                }
                -32768..=32767 => {
                    data.push(28);
                    data.extend_from_slice(&i16::to_be_bytes(n as i16));
                }
                _ => {
                    data.push(29);
                    data.extend_from_slice(&i32::to_be_bytes(n));
                }
            },
            TtfType::CFFInt32(n) => {
                data.push(29);
                data.extend_from_slice(&i32::to_be_bytes(n));
            }
            TtfType::Op(op) => data.push(op),
            TtfType::Op2(op) => data.extend_from_slice(&[12, op]),
        }
    }

    /// Build an INDEX holding `objects` using the smallest offset size that fits.
    pub fn index(objects: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(objects.len() as u16).to_be_bytes());
        if objects.is_empty() {
            return data;
        }

        let last_offset = objects.iter().map(|object| object.len()).sum::<usize>() + 1;
        let off_size = match last_offset {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            0x1_0000..=0xFF_FFFF => 3,
            _ => 4,
        };
        data.push(off_size as u8);

        let mut offset = 1usize;
        let push_offset = |data: &mut Vec<u8>, offset: usize| {
            let bytes = (offset as u32).to_be_bytes();
            data.extend_from_slice(&bytes[4 - off_size..]);
        };
        push_offset(&mut data, offset);
        for object in objects {
            offset += object.len();
            push_offset(&mut data, offset);
        }
        for object in objects {
            data.extend_from_slice(object);
        }

        data
    }

    fn index_of(objects: &[Vec<u8>]) -> Vec<u8> {
        let objects = objects.iter().map(Vec::as_slice).collect::<Vec<_>>();
        index(&objects)
    }

    /// Assembles a single font CFF table.
    ///
    /// Offsets in the Top DICT and Private DICTs are written with the 5 byte integer encoding
    /// so their size does not depend on their value.
    #[derive(Debug, Clone)]
    pub struct CffBuilder {
        pub name: String,
        pub strings: Vec<String>,
        /// Top DICT entries other than the offsets filled in by the builder.
        pub top_dict: Vec<u8>,
        pub global_subrs: Vec<Vec<u8>>,
        pub char_strings: Vec<Vec<u8>>,
        /// Charset data starting with the format byte. `None` uses the ISOAdobe charset.
        pub charset: Option<Vec<u8>>,
        /// Private DICT entries other than Subrs. Not written for CID-keyed fonts.
        pub private_dict: Vec<u8>,
        pub local_subrs: Vec<Vec<u8>>,
        /// FDSelect data starting with the format byte. Makes the font CID-keyed.
        pub fd_select: Option<Vec<u8>>,
        /// Private DICT entries of each Font DICT in the FDArray.
        pub font_dict_privates: Vec<Vec<u8>>,
    }

    impl CffBuilder {
        pub fn new() -> Self {
            CffBuilder {
                name: String::from("TestFont"),
                strings: Vec::new(),
                top_dict: Vec::new(),
                global_subrs: Vec::new(),
                char_strings: Vec::new(),
                charset: None,
                private_dict: Vec::new(),
                local_subrs: Vec::new(),
                fd_select: None,
                font_dict_privates: Vec::new(),
            }
        }

        pub fn build(&self) -> Vec<u8> {
            let name_index = index(&[self.name.as_bytes()]);
            let strings = self
                .strings
                .iter()
                .map(|string| string.as_bytes())
                .collect::<Vec<_>>();
            let string_index = index(&strings);
            let global_subr_index = index_of(&self.global_subrs);
            let char_strings_index = index_of(&self.char_strings);
            let charset = self.charset.clone().unwrap_or_default();

            // Build the Top DICT once with placeholder offsets to learn its size
            let top_dict = |offsets: &TopDictOffsets| self.build_top_dict(offsets);
            let placeholder = top_dict(&TopDictOffsets::default());
            let top_dict_index_len = index(&[&placeholder]).len();

            let char_strings_offset = 4
                + name_index.len()
                + top_dict_index_len
                + string_index.len()
                + global_subr_index.len();
            let charset_offset = char_strings_offset + char_strings_index.len();
            let mut offset = charset_offset + charset.len();

            let mut tail = Vec::new();
            let mut offsets = TopDictOffsets {
                char_strings: char_strings_offset,
                charset: self.charset.as_ref().map(|_| charset_offset),
                ..TopDictOffsets::default()
            };

            if let Some(fd_select) = &self.fd_select {
                offsets.fd_select = Some(offset);
                tail.extend_from_slice(fd_select);
                offset += fd_select.len();

                // Each Font DICT is a fixed size Private operator
                let fd_array_len = index_of(&vec![vec![0; 11]; self.font_dict_privates.len()]).len();
                offsets.fd_array = Some(offset);
                let mut private_offset = offset + fd_array_len;
                let font_dicts = self
                    .font_dict_privates
                    .iter()
                    .map(|private| {
                        let font_dict = private_operator(private.len(), private_offset);
                        private_offset += private.len();
                        font_dict
                    })
                    .collect::<Vec<_>>();
                tail.extend(index_of(&font_dicts));
                for private in &self.font_dict_privates {
                    tail.extend_from_slice(private);
                }
            } else {
                let mut private = self.private_dict.clone();
                if !self.local_subrs.is_empty() {
                    // Subrs offset is relative to the start of the Private DICT
                    let subrs_offset = private.len() + 6;
                    convert_type(TtfType::CFFInt32(subrs_offset as i32), &mut private);
                    convert_type(TtfType::Op(19), &mut private);
                }
                offsets.private = Some((private.len(), offset));
                tail.extend(private);
                if !self.local_subrs.is_empty() {
                    tail.extend(index_of(&self.local_subrs));
                }
            }

            let top_dict = top_dict(&offsets);
            assert_eq!(top_dict.len(), placeholder.len());

            let mut data = vec![1, 0, 4, 4];
            data.extend(name_index);
            data.extend(index(&[&top_dict]));
            data.extend(string_index);
            data.extend(global_subr_index);
            data.extend(char_strings_index);
            data.extend(charset);
            data.extend(tail);
            data
        }

        fn build_top_dict(&self, offsets: &TopDictOffsets) -> Vec<u8> {
            let is_cid = self.fd_select.is_some();
            let mut dict = self.top_dict.clone();
            if self.charset.is_some() {
                let offset = offsets.charset.unwrap_or_default();
                convert_type(TtfType::CFFInt32(offset as i32), &mut dict);
                convert_type(TtfType::Op(15), &mut dict);
            }
            convert_type(TtfType::CFFInt32(offsets.char_strings as i32), &mut dict);
            convert_type(TtfType::Op(17), &mut dict);
            if is_cid {
                let fd_array = offsets.fd_array.unwrap_or_default();
                convert_type(TtfType::CFFInt32(fd_array as i32), &mut dict);
                convert_type(TtfType::Op2(36), &mut dict);
                let fd_select = offsets.fd_select.unwrap_or_default();
                convert_type(TtfType::CFFInt32(fd_select as i32), &mut dict);
                convert_type(TtfType::Op2(37), &mut dict);
            } else {
                let (size, offset) = offsets.private.unwrap_or_default();
                dict.extend(private_operator(size, offset));
            }
            dict
        }
    }

    #[derive(Debug, Default)]
    struct TopDictOffsets {
        char_strings: usize,
        charset: Option<usize>,
        private: Option<(usize, usize)>,
        fd_array: Option<usize>,
        fd_select: Option<usize>,
    }

    fn private_operator(size: usize, offset: usize) -> Vec<u8> {
        convert(&[
            TtfType::CFFInt32(size as i32),
            TtfType::CFFInt32(offset as i32),
            TtfType::Op(18),
        ])
    }
}

use crate::{bits::*, color::Rgb, encode::*, *};
use alloc::vec::Vec;

pub struct Decoder<'a> {
    reader: BitReader<'a>,
    info: ImageInfo,
    pixel_count: usize,
    index_bits: u32,
    padded: bool,
}

impl<'a> Decoder<'a> {
    /// Reads the header of a stream holding exactly `bit_len` meaningful bits.
    ///
    /// Fails with [`DecodeError::MalformedStream`] if `blob` holds fewer than `bit_len` bits.
    pub fn new(blob: &'a [u8], bit_len: usize) -> Result<Self, DecodeError> {
        let reader = BitReader::new(blob, bit_len).ok_or(DecodeError::MalformedStream)?;
        Self::with_reader(reader, false)
    }

    /// Reads the header of a byte-aligned stream, as stored in a file.
    ///
    /// Up to 7 trailing zero bits after the last color group are taken as padding.
    /// No color group is shorter than 27 bits, so padding is never mistaken for one.
    pub fn from_padded(blob: &'a [u8]) -> Result<Self, DecodeError> {
        let bit_len = blob
            .len()
            .checked_mul(8)
            .ok_or(DecodeError::InvalidInput)?;
        let reader = BitReader::new(blob, bit_len).ok_or(DecodeError::InvalidInput)?;
        Self::with_reader(reader, true)
    }

    fn with_reader(reader: BitReader<'a>, padded: bool) -> Result<Self, DecodeError> {
        let mut decoder = Self {
            reader,
            info: ImageInfo::new(0, 0, Rgb::BLACK),
            pixel_count: 0,
            index_bits: 0,
            padded,
        };
        let background = decoder.read_color()?;
        decoder.index_bits = decoder.read(MAX_INDEX_BITS)? as u32;
        let width = decoder.read_dimension()?;
        let height = decoder.read_dimension()?;
        decoder.info = ImageInfo::new(width, height, background);

        // Older writers used `ceil(log2(N))`, which is one bit short when N is a power of two.
        let pixel_count = decoder
            .info
            .pixel_count()
            .ok_or(DecodeError::MalformedStream)?;
        if decoder.index_bits != index_bits(pixel_count)
            && decoder.index_bits != short_index_bits(pixel_count)
        {
            return Err(DecodeError::MalformedStream);
        }
        decoder.pixel_count = pixel_count;
        Ok(decoder)
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    #[inline]
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Reads every color group. Any error discards the whole image.
    pub fn decode(mut self) -> Result<CmifImage, DecodeError> {
        log::debug!(
            "decoding {}x{} (index bits: {})",
            self.info.width,
            self.info.height,
            self.index_bits
        );
        let mut groups = Vec::new();
        while !self.at_end() {
            let mut group = ColorGroup::new(self.read_color()?);
            loop {
                let tag = self.read(TAG_BITS)?;
                group.entries.push(self.read_entry(tag & TAG_RUN != 0)?);
                if tag & TAG_TERMINAL != 0 {
                    break;
                }
            }
            log::trace!(
                "group #{:06x}: {} entries",
                group.color.to_u32(),
                group.entries.len()
            );
            groups.push(group);
        }
        CmifImage::new(self.info, groups).map_err(|_| DecodeError::MalformedStream)
    }

    fn at_end(&self) -> bool {
        self.reader.is_empty()
            || (self.padded && self.reader.remaining() < 8 && self.reader.rest_is_zero())
    }

    #[inline]
    fn read(&mut self, bits: u32) -> Result<u128, DecodeError> {
        self.reader
            .read_bits(bits)
            .ok_or(DecodeError::MalformedStream)
    }

    #[inline]
    fn read_color(&mut self) -> Result<Rgb, DecodeError> {
        self.read(COLOR_BITS).map(|v| Rgb::from_u32(v as u32))
    }

    #[inline]
    fn read_index(&mut self) -> Result<usize, DecodeError> {
        let value = self.read(self.index_bits)?;
        usize::try_from(value).map_err(|_| DecodeError::MalformedStream)
    }

    fn read_dimension(&mut self) -> Result<u32, DecodeError> {
        let value = self.read(self.index_bits)?;
        match u32::try_from(value) {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(DecodeError::MalformedStream),
        }
    }

    fn read_entry(&mut self, is_run: bool) -> Result<Entry, DecodeError> {
        let pixel_count = self.pixel_count;
        let start = self.read_index()?;
        if is_run {
            let end = self.read_index()?;
            if start >= end || end > pixel_count {
                return Err(DecodeError::MalformedStream);
            }
            Ok(Entry::Run { start, end })
        } else {
            if start >= pixel_count {
                return Err(DecodeError::MalformedStream);
            }
            Ok(Entry::Single(start))
        }
    }
}

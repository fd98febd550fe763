//! CMIF - Color Map Image Format
//!
//! A lossless image format for flat-color and palette-like images.
//! Pixels are grouped by exact color into runs of consecutive linear indices,
//! the most fragmented color is elided as background, and the rest is bit-packed
//! with a single index width derived from the pixel count.
//!
//! Photographs compress poorly as-is; run them through [`Preprocess`] (grayscale
//! and/or error-diffusion dithering) before [`convert`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use core::fmt;
#[cfg(feature = "embedded")]
use embedded_graphics::prelude::Size;

pub mod bits;
pub mod color;

mod convert;
pub use convert::*;

mod decode;
pub use decode::*;

mod encode;
pub use encode::*;

mod filter;
pub use filter::*;

mod raster;
pub use raster::*;


use color::Rgb;

pub const PREFERRED_FILE_EXT: &str = "cmif";

/// Width of the field holding the index bit width
pub const MAX_INDEX_BITS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EncodeError {
    /// Empty buffer or out of range pixel access
    InvalidInput,
    /// Dithering level outside `2..=256`
    InvalidParameter,
    /// The index bit width does not fit in its header field
    FormatLimitExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecodeError {
    InvalidInput,
    /// Truncated stream or a field out of range
    MalformedStream,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("invalid input image"),
            Self::InvalidParameter => f.write_str("invalid parameter"),
            Self::FormatLimitExceeded => f.write_str("image exceeds the format limits"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("invalid input"),
            Self::MalformedStream => f.write_str("malformed stream"),
        }
    }
}

impl core::error::Error for EncodeError {}

impl core::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
}

impl ImageInfo {
    #[inline]
    pub const fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
        }
    }

    /// Returns `None` if `width * height` does not fit in `usize`.
    #[inline]
    pub const fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Bit width of every index field, and of width and height
    #[inline]
    pub const fn index_bits(&self) -> Option<u32> {
        match self.pixel_count() {
            Some(count) => Some(index_bits(count)),
            None => None,
        }
    }
}

#[cfg(feature = "embedded")]
impl From<ImageInfo> for Size {
    #[inline]
    fn from(info: ImageInfo) -> Self {
        Self::new(info.width, info.height)
    }
}

/// Bits needed to store any value in `0..=pixel_count`.
///
/// The exclusive end of a run may equal `pixel_count`, so this is `ceil(log2(pixel_count + 1))`.
#[inline]
pub const fn index_bits(pixel_count: usize) -> u32 {
    usize::BITS - pixel_count.leading_zeros()
}

/// `ceil(log2(pixel_count))`, the index width of streams that cannot hold `pixel_count` itself.
///
/// Still accepted when decoding; never written.
#[inline]
pub const fn short_index_bits(pixel_count: usize) -> u32 {
    index_bits(pixel_count.saturating_sub(1))
}

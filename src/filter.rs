//! In-place preprocessing filters.
//!
//! Both filters visit rows `0..height-1` and columns `1..width-1` only. The last row and
//! the left and right border columns are never converted or quantized, although dithering
//! still diffuses error into them.

use crate::{color::*, *};
use heapless::Vec;

/// Accepted range for the number of dithering levels per channel
pub const DITHER_LEVELS: core::ops::RangeInclusive<u16> = 2..=256;

/// Floyd-Steinberg kernel as `(dx, dy, weight / 16)`
const DIFFUSION: [(i32, u32, i32); 4] = [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

/// Canonical preprocessing chain applied before conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preprocess {
    pub grayscale: bool,
    /// Quantization levels per channel
    pub dither: Option<u16>,
}

impl Preprocess {
    #[inline]
    pub fn validate(&self) -> Result<(), EncodeError> {
        match self.dither {
            Some(levels) if !DITHER_LEVELS.contains(&levels) => Err(EncodeError::InvalidParameter),
            _ => Ok(()),
        }
    }

    /// Grayscale first, then dithering. Nothing is touched if the parameters are invalid.
    pub fn apply<P: PixelBuffer + ?Sized>(&self, buffer: &mut P) -> Result<(), EncodeError> {
        self.validate()?;
        if self.grayscale {
            grayscale(buffer)?;
        }
        if let Some(levels) = self.dither {
            dither(buffer, levels)?;
        }
        Ok(())
    }
}

pub fn grayscale<P: PixelBuffer + ?Sized>(buffer: &mut P) -> Result<(), EncodeError> {
    log::debug!("applying grayscale");
    for y in 0..buffer.height().saturating_sub(1) {
        for x in 1..buffer.width().saturating_sub(1) {
            let px = buffer.get(x, y).ok_or(EncodeError::InvalidInput)?;
            buffer
                .set(x, y, Rgb::gray(px.luma()))
                .ok_or(EncodeError::InvalidInput)?;
        }
    }
    Ok(())
}

/// Error-diffusion dithering down to `levels` values per channel.
///
/// Must run sequentially: every pixel reads the error already pushed into it by its
/// left and upper neighbors.
pub fn dither<P: PixelBuffer + ?Sized>(buffer: &mut P, levels: u16) -> Result<(), EncodeError> {
    let quantizer = Quantizer::new(levels)?;
    log::debug!("applying dithering ({} levels)", levels);

    let width = buffer.width();
    let height = buffer.height();
    for y in 0..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let px = buffer.get(x, y).ok_or(EncodeError::InvalidInput)?;

            let mut quantized = [0u8; 3];
            let mut error = [0i32; 3];
            for (c, value) in px.channels().into_iter().enumerate() {
                (quantized[c], error[c]) = quantizer.quantize(value);
            }
            buffer
                .set(x, y, Rgb::from_channels(quantized))
                .ok_or(EncodeError::InvalidInput)?;

            for (nx, ny, weight) in neighbors(x, y, width, height) {
                let mut channels = buffer
                    .get(nx, ny)
                    .ok_or(EncodeError::InvalidInput)?
                    .channels();
                for (channel, err) in channels.iter_mut().zip(error) {
                    *channel = clamp_u8(*channel as i32 + quantizer.diffuse(err, weight));
                }
                buffer
                    .set(nx, ny, Rgb::from_channels(channels))
                    .ok_or(EncodeError::InvalidInput)?;
            }
        }
    }
    Ok(())
}

/// Diffusion targets of `(x, y)` that lie inside the buffer
pub(crate) fn neighbors(x: u32, y: u32, width: u32, height: u32) -> Vec<(u32, u32, i32), 4> {
    DIFFUSION
        .into_iter()
        .filter_map(|(dx, dy, weight)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add(dy)?;
            (nx < width && ny < height).then_some((nx, ny, weight))
        })
        .collect()
}

/// Uniform quantizer kept in exact integer arithmetic.
///
/// A channel value `p` maps to step `k = round(p * steps / 255)`, whose exact level is
/// `k * 255 / steps`. Errors are carried as numerators over `steps`.
#[derive(Debug, Clone, Copy)]
struct Quantizer {
    steps: i32,
}

impl Quantizer {
    #[inline]
    fn new(levels: u16) -> Result<Self, EncodeError> {
        if !DITHER_LEVELS.contains(&levels) {
            return Err(EncodeError::InvalidParameter);
        }
        Ok(Self {
            steps: levels as i32 - 1,
        })
    }

    /// Returns the stored level and the error numerator.
    #[inline]
    fn quantize(&self, value: u8) -> (u8, i32) {
        let scaled = value as i32 * self.steps;
        let k = div_round_even(scaled, 255);
        let level = div_round_even(k * 255, self.steps);
        (clamp_u8(level), scaled - k * 255)
    }

    /// `round(weight / 16 * error)`
    #[inline]
    fn diffuse(&self, error: i32, weight: i32) -> i32 {
        div_round_even(weight * error, 16 * self.steps)
    }
}

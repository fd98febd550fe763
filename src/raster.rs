use crate::{color::Rgb, *};
use alloc::vec::Vec;
use core::ops::Range;

#[cfg(feature = "embedded")]
use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::Rectangle};

/// Random access raster of 24bit pixels.
///
/// Pixels are addressed either by `(x, y)` or by the row-major linear index `y * width + x`.
pub trait PixelBuffer {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Returns `None` if `(x, y)` lies outside the buffer.
    fn get(&self, x: u32, y: u32) -> Option<Rgb>;

    /// Returns `None` if `(x, y)` lies outside the buffer.
    fn set(&mut self, x: u32, y: u32, color: Rgb) -> Option<()>;

    /// Returns `None` if `width * height` does not fit in `usize`.
    #[inline]
    fn pixel_count(&self) -> Option<usize> {
        (self.width() as usize).checked_mul(self.height() as usize)
    }

    #[inline]
    fn get_index(&self, index: usize) -> Option<Rgb> {
        let (x, y) = index_to_xy(index, self.width())?;
        self.get(x, y)
    }

    #[inline]
    fn set_index(&mut self, index: usize, color: Rgb) -> Option<()> {
        let (x, y) = index_to_xy(index, self.width())?;
        self.set(x, y, color)
    }
}

#[inline]
pub(crate) fn index_to_xy(index: usize, width: u32) -> Option<(u32, u32)> {
    let width = width as usize;
    if width == 0 {
        return None;
    }
    let y = u32::try_from(index / width).ok()?;
    Some(((index % width) as u32, y))
}

/// Heap allocated [`PixelBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl RgbBuffer {
    /// Returns `None` if the buffer cannot be allocated.
    #[inline]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Self::filled(width, height, Rgb::BLACK)
    }

    /// Returns `None` if the buffer cannot be allocated.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, color);
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a buffer from row-major pixels. Returns `None` if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        (pixels.len() == len).then(|| Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a buffer from interleaved RGB8 bytes.
    pub fn from_rgb(data: &[u8], width: u32, height: u32) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        let bytes = data.get(..len.checked_mul(3)?)?;
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Interleaved RGB8 bytes
    pub fn as_raw_rgb(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|rgb| rgb.channels()).collect()
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

impl PixelBuffer for RgbBuffer {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.offset(x, y).map(|offset| self.pixels[offset])
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, color: Rgb) -> Option<()> {
        let offset = self.offset(x, y)?;
        self.pixels[offset] = color;
        Some(())
    }

    #[inline]
    fn get_index(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    #[inline]
    fn set_index(&mut self, index: usize, color: Rgb) -> Option<()> {
        *self.pixels.get_mut(index)? = color;
        Some(())
    }
}

/// One element of a color group: a lone pixel or a run of consecutive linear indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Single(usize),
    /// Half-open `[start, end)`
    Run { start: usize, end: usize },
}

impl Entry {
    #[inline]
    pub const fn start(&self) -> usize {
        match *self {
            Entry::Single(index) => index,
            Entry::Run { start, .. } => start,
        }
    }

    /// Exclusive end
    #[inline]
    pub const fn end(&self) -> usize {
        match *self {
            Entry::Single(index) => index + 1,
            Entry::Run { end, .. } => end,
        }
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    #[inline]
    pub const fn is_run(&self) -> bool {
        matches!(self, Entry::Run { .. })
    }
}

/// All the entries sharing one color, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGroup {
    pub color: Rgb,
    pub entries: Vec<Entry>,
}

impl ColorGroup {
    #[inline]
    pub const fn new(color: Rgb) -> Self {
        Self {
            color,
            entries: Vec::new(),
        }
    }

    /// Number of pixels covered
    pub fn coverage(&self) -> usize {
        self.entries.iter().map(|entry| entry.range().len()).sum()
    }
}

/// Color-grouped image: every pixel not covered by a group is background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmifImage {
    info: ImageInfo,
    pixel_count: usize,
    groups: Vec<ColorGroup>,
}

impl CmifImage {
    /// Fails with [`EncodeError::InvalidInput`] for an empty canvas, a pixel count beyond
    /// `usize`, an empty group, or an entry outside the canvas.
    pub fn new(info: ImageInfo, groups: Vec<ColorGroup>) -> Result<Self, EncodeError> {
        let pixel_count = match info.pixel_count() {
            Some(count) if count > 0 => count,
            _ => return Err(EncodeError::InvalidInput),
        };
        for group in &groups {
            if group.entries.is_empty() {
                return Err(EncodeError::InvalidInput);
            }
            for entry in &group.entries {
                let valid = match *entry {
                    Entry::Single(index) => index < pixel_count,
                    Entry::Run { start, end } => start < end && end <= pixel_count,
                };
                if !valid {
                    return Err(EncodeError::InvalidInput);
                }
            }
        }
        Ok(Self {
            info,
            pixel_count,
            groups,
        })
    }

    #[inline]
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.info.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.info.height
    }

    #[inline]
    pub fn background(&self) -> Rgb {
        self.info.background
    }

    #[inline]
    pub fn groups(&self) -> &[ColorGroup] {
        &self.groups
    }

    pub fn group(&self, color: Rgb) -> Option<&ColorGroup> {
        self.groups.iter().find(|group| group.color == color)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Bit width the encoder uses for this image
    #[inline]
    pub fn index_bits(&self) -> u32 {
        index_bits(self.pixel_count)
    }

    /// Every entry as a colored index range, groups first then entries, in stored order.
    pub fn spans(&self) -> impl Iterator<Item = (Rgb, Range<usize>)> + '_ {
        self.groups.iter().flat_map(|group| {
            group
                .entries
                .iter()
                .map(move |entry| (group.color, entry.range()))
        })
    }

    /// Paints the image into `target`, which must have the same resolution.
    pub fn render_into<P: PixelBuffer>(&self, target: &mut P) -> Result<(), DecodeError> {
        if target.width() != self.width() || target.height() != self.height() {
            return Err(DecodeError::InvalidInput);
        }
        let background = self.background();
        for index in 0..self.pixel_count() {
            target
                .set_index(index, background)
                .ok_or(DecodeError::InvalidInput)?;
        }
        for (color, range) in self.spans() {
            for index in range {
                target
                    .set_index(index, color)
                    .ok_or(DecodeError::InvalidInput)?;
            }
        }
        Ok(())
    }

    pub fn to_rgb_buffer(&self) -> Result<RgbBuffer, DecodeError> {
        let mut buffer = RgbBuffer::filled(self.width(), self.height(), self.background())
            .ok_or(DecodeError::InvalidInput)?;
        for (color, range) in self.spans() {
            for index in range {
                buffer
                    .set_index(index, color)
                    .ok_or(DecodeError::InvalidInput)?;
            }
        }
        Ok(buffer)
    }
}

#[cfg(feature = "embedded")]
impl OriginDimensions for CmifImage {
    #[inline]
    fn size(&self) -> Size {
        self.info().into()
    }
}

#[cfg(feature = "embedded")]
impl ImageDrawable for CmifImage {
    type Color = Rgb888;

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let width = self.width() as usize;
        target.fill_solid(
            &Rectangle::new(Point::zero(), self.size()),
            self.background().into(),
        )?;
        target.draw_iter(self.spans().flat_map(|(color, range)| {
            range.map(move |index| {
                let point = Point::new((index % width) as i32, (index / width) as i32);
                Pixel(point, color.into())
            })
        }))
    }

    fn draw_sub_image<D>(&self, target: &mut D, area: &Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        self.draw(&mut target.translated(-area.top_left).clipped(area))
    }
}

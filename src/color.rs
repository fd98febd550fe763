#[cfg(feature = "embedded")]
use embedded_graphics::pixelcolor::{
    Bgr555, Bgr565, Bgr666, Bgr888, Rgb555, Rgb565, Rgb666, Rgb888, RgbColor,
};

/// 24bit color, the key of a color group
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn gray(c: u8) -> Self {
        Self { r: c, g: c, b: c }
    }

    #[inline]
    pub const fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub const fn from_channels(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Rec.601 luma, `round(0.299R + 0.587G + 0.114B)` with ties to even.
    #[inline]
    pub const fn luma(&self) -> u8 {
        let sum = 299 * self.r as i32 + 587 * self.g as i32 + 114 * self.b as i32;
        div_round_even(sum, 1000) as u8
    }

    /// Packs into `0x00RRGGBB`
    #[inline]
    pub const fn to_u32(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[inline]
    pub const fn from_u32(val: u32) -> Self {
        Self::new((val >> 16) as u8, (val >> 8) as u8, val as u8)
    }
}

impl From<[u8; 3]> for Rgb {
    #[inline]
    fn from(c: [u8; 3]) -> Self {
        Self::from_channels(c)
    }
}

impl From<Rgb> for [u8; 3] {
    #[inline]
    fn from(rgb: Rgb) -> Self {
        rgb.channels()
    }
}

#[cfg(feature = "embedded")]
impl From<Rgb888> for Rgb {
    #[inline]
    fn from(c: Rgb888) -> Self {
        Self::new(c.r(), c.g(), c.b())
    }
}

macro_rules! from_rgb {
    ($ident:ident, $shift_r:expr, $shift_g:expr, $shift_b:expr) => {
        #[cfg(feature = "embedded")]
        impl From<Rgb> for $ident {
            #[inline]
            fn from(rgb: Rgb) -> Self {
                Self::new(
                    rgb.r.wrapping_shr($shift_r),
                    rgb.g.wrapping_shr($shift_g),
                    rgb.b.wrapping_shr($shift_b),
                )
            }
        }
    };
}

from_rgb!(Rgb555, 3, 3, 3);
from_rgb!(Bgr555, 3, 3, 3);
from_rgb!(Rgb565, 3, 2, 3);
from_rgb!(Bgr565, 3, 2, 3);
from_rgb!(Rgb666, 2, 2, 2);
from_rgb!(Bgr666, 2, 2, 2);
from_rgb!(Rgb888, 0, 0, 0);
from_rgb!(Bgr888, 0, 0, 0);

/// `num / den` rounded to the nearest integer, ties to even. `den` must be positive.
#[inline]
pub(crate) const fn div_round_even(num: i32, den: i32) -> i32 {
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    if r * 2 > den || (r * 2 == den && q & 1 != 0) {
        q + 1
    } else {
        q
    }
}

/// Clamps to the 8bit channel range
#[inline]
pub(crate) const fn clamp_u8(val: i32) -> u8 {
    if val < 0 {
        0
    } else if val > 255 {
        255
    } else {
        val as u8
    }
}

use crate::{bits::*, *};

/// Set on the last entry of a color group
pub(crate) const TAG_TERMINAL: u128 = 0b10;
/// Set when the entry is a run (two index fields follow)
pub(crate) const TAG_RUN: u128 = 0b01;

pub(crate) const TAG_BITS: u32 = 2;
pub(crate) const COLOR_BITS: u32 = 24;

pub struct Encoder;

impl Encoder {
    /// Packs `image` into a bitstream. The exact length is kept in the result.
    pub fn encode(image: &CmifImage) -> Result<BitBuf, EncodeError> {
        let mut writer = BitWriter::new();
        Self::encode_to_sink(image, &mut writer)?;
        log::debug!("encoded {} bits", writer.bit_len());
        Ok(writer.finish())
    }

    /// Nothing is written unless the whole image is encodable.
    ///
    /// Group and entry ranges are already checked by [`CmifImage::new`].
    pub fn encode_to_sink<S>(image: &CmifImage, sink: &mut S) -> Result<(), EncodeError>
    where
        S: BitSink + ?Sized,
    {
        let info = image.info();
        let index_bits = image.index_bits();
        if index_bits >= 1 << MAX_INDEX_BITS {
            return Err(EncodeError::FormatLimitExceeded);
        }

        log::debug!("encoding (index bits: {})", index_bits);
        sink.put_bits(info.background.to_u32() as u128, COLOR_BITS);
        sink.put_bits(index_bits as u128, MAX_INDEX_BITS);
        sink.put_bits(info.width as u128, index_bits);
        sink.put_bits(info.height as u128, index_bits);

        for group in image.groups() {
            let Some((last, rest)) = group.entries.split_last() else {
                continue;
            };
            log::trace!(
                "group #{:06x}: {} entries",
                group.color.to_u32(),
                group.entries.len()
            );
            sink.put_bits(group.color.to_u32() as u128, COLOR_BITS);
            for entry in rest {
                Self::put_entry(sink, entry, false, index_bits);
            }
            Self::put_entry(sink, last, true, index_bits);
        }

        Ok(())
    }

    #[inline]
    fn put_entry<S>(sink: &mut S, entry: &Entry, terminal: bool, index_bits: u32)
    where
        S: BitSink + ?Sized,
    {
        let terminal = if terminal { TAG_TERMINAL } else { 0 };
        match *entry {
            Entry::Single(index) => {
                sink.put_bits(terminal, TAG_BITS);
                sink.put_bits(index as u128, index_bits);
            }
            Entry::Run { start, end } => {
                sink.put_bits(terminal | TAG_RUN, TAG_BITS);
                sink.put_bits(start as u128, index_bits);
                sink.put_bits(end as u128, index_bits);
            }
        }
    }
}

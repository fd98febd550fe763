use crate::{color::Rgb, *};
use alloc::{collections::BTreeMap, vec::Vec};

/// Groups the pixels of `buffer` by color and elides the background.
///
/// The canvas is scanned as one row-major sequence, so a run may continue across
/// a row boundary.
pub fn convert<P: PixelBuffer + ?Sized>(buffer: &P) -> Result<CmifImage, EncodeError> {
    let count = buffer.pixel_count().ok_or(EncodeError::InvalidInput)?;
    if count == 0 {
        return Err(EncodeError::InvalidInput);
    }

    log::debug!("mapping colors ({}x{})", buffer.width(), buffer.height());
    let mut groups = GroupMap::default();
    let mut color = buffer.get_index(0).ok_or(EncodeError::InvalidInput)?;
    let mut index = 0;
    while index < count {
        let start = index;
        let mut next = None;
        index += 1;
        while index < count {
            let rgb = buffer.get_index(index).ok_or(EncodeError::InvalidInput)?;
            if rgb != color {
                next = Some(rgb);
                break;
            }
            index += 1;
        }
        let entry = if index - start == 1 {
            Entry::Single(start)
        } else {
            Entry::Run { start, end: index }
        };
        groups.push(color, entry);
        if let Some(rgb) = next {
            color = rgb;
        }
    }

    log::debug!("optimizing");
    let mut groups = groups.into_groups();
    let background = elide_background(&mut groups).ok_or(EncodeError::InvalidInput)?;
    log::trace!(
        "background #{:06x}, {} groups left",
        background.to_u32(),
        groups.len()
    );

    CmifImage::new(
        ImageInfo::new(buffer.width(), buffer.height(), background),
        groups,
    )
}

/// Removes the group with the most entries and returns its color.
///
/// Entries are counted, not pixels. On a tie the earliest group wins.
pub fn elide_background(groups: &mut Vec<ColorGroup>) -> Option<Rgb> {
    let mut best: Option<(usize, usize)> = None;
    for (position, group) in groups.iter().enumerate() {
        let len = group.entries.len();
        if best.is_none_or(|(_, max)| len > max) {
            best = Some((position, len));
        }
    }
    best.map(|(position, _)| groups.remove(position).color)
}

/// Color groups in first-seen order
#[derive(Default)]
struct GroupMap {
    groups: Vec<ColorGroup>,
    lookup: BTreeMap<Rgb, usize>,
}

impl GroupMap {
    #[inline]
    fn push(&mut self, color: Rgb, entry: Entry) {
        let position = *self.lookup.entry(color).or_insert_with(|| {
            self.groups.push(ColorGroup::new(color));
            self.groups.len() - 1
        });
        self.groups[position].entries.push(entry);
    }

    #[inline]
    fn into_groups(self) -> Vec<ColorGroup> {
        self.groups
    }
}

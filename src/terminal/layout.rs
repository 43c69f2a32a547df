use crate::events::NavigatorInput;

/// Rows each carousel occupies: title, slide, indicators, spacer.
pub const BAND_HEIGHT: u16 = 4;
/// Column of the first indicator glyph; indicators sit two columns apart.
pub const INDICATOR_COL: u16 = 2;
/// Minimum width so both controls fit beside a caption.
pub const MIN_WIDTH: u16 = 16;

const SLIDE_ROW: u16 = 1;
const INDICATOR_ROW: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub top: u16,
    pub indicators: usize,
}

impl Band {
    pub fn slide_row(&self) -> u16 {
        self.top + SLIDE_ROW
    }

    pub fn indicator_row(&self) -> u16 {
        self.top + INDICATOR_ROW
    }

    fn contains_row(&self, row: u16) -> bool {
        row >= self.top && row < self.top + BAND_HEIGHT - 1
    }
}

/// Screen geometry shared by the surfaces (drawing) and the input reader
/// (hit testing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: u16,
    bands: Vec<Band>,
}

impl Layout {
    pub fn new(width: u16) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            bands: Vec::new(),
        }
    }

    /// Rebuilds a layout from bands already handed out; widget ids follow
    /// iteration order.
    pub fn from_bands(width: u16, bands: impl IntoIterator<Item = Band>) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            bands: bands.into_iter().collect(),
        }
    }

    /// Appends a band below the previous one and returns it.
    pub fn push(&mut self, indicators: usize) -> Band {
        let top = self.bands.len() as u16 * BAND_HEIGHT;
        let band = Band { top, indicators };
        self.bands.push(band);
        band
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Carousel whose band covers `row`. The spacer row belongs to nobody.
    pub fn widget_at(&self, row: u16) -> Option<usize> {
        self.bands.iter().position(|band| band.contains_row(row))
    }

    /// Trigger under a click at `(col, row)`, if any. Controls are hit-tested
    /// even when hidden; the navigator drops triggers it never subscribed to.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<(usize, NavigatorInput)> {
        let id = self.widget_at(row)?;
        let band = self.bands[id];
        if row == band.slide_row() {
            if col <= 1 {
                return Some((id, NavigatorInput::PrevTrigger));
            }
            if col >= self.width - 2 {
                return Some((id, NavigatorInput::NextTrigger));
            }
        }
        if row == band.indicator_row() && col >= INDICATOR_COL {
            let offset = col - INDICATOR_COL;
            let index = usize::from(offset / 2);
            if offset % 2 == 0 && index < band.indicators {
                return Some((id, NavigatorInput::Indicator(index)));
            }
        }
        None
    }
}

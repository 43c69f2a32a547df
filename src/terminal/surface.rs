use std::collections::BTreeSet;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use tracing::warn;

use super::layout::{Band, INDICATOR_COL};
use crate::config::TransitionKind;
use crate::events::InputSource;
use crate::surface::{RenderSurface, TextLabel};

/// Draws one carousel into its band of terminal rows.
pub struct TerminalSurface<W: Write> {
    out: W,
    band: Band,
    width: u16,
    name: String,
    captions: Vec<String>,
    slides: Vec<bool>,
    indicators: Vec<bool>,
    controls_visible: bool,
    indicators_visible: bool,
    transition: TransitionKind,
    label: Option<TextLabel>,
    subscriptions: BTreeSet<InputSource>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, band: Band, width: u16, name: &str, captions: Vec<String>) -> Self {
        let count = captions.len();
        Self {
            out,
            band,
            width,
            name: name.to_string(),
            captions,
            slides: vec![false; count],
            indicators: vec![false; band.indicators],
            controls_visible: false,
            indicators_visible: false,
            transition: TransitionKind::default(),
            label: None,
            subscriptions: BTreeSet::new(),
        }
    }

    pub fn with_label(mut self) -> Self {
        self.label = Some(TextLabel::new());
        self
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self) -> io::Result<()> {
        let width = usize::from(self.width);
        let title = match self.label.as_ref().map(TextLabel::get) {
            Some(counter) if !counter.is_empty() => format!("{}  {}", self.name, counter),
            _ => self.name.clone(),
        };
        queue!(
            self.out,
            MoveTo(0, self.band.top),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Bold),
            Print(truncate(&title, width)),
            SetAttribute(Attribute::Reset)
        )?;

        let caption = self
            .slides
            .iter()
            .position(|on| *on)
            .and_then(|idx| self.captions.get(idx))
            .map(String::as_str)
            .unwrap_or("");
        let inner = width.saturating_sub(4);
        let body = format!("{:^inner$}", truncate(caption, inner));
        let style = match self.transition {
            TransitionKind::Slide => Attribute::NormalIntensity,
            TransitionKind::Fade => Attribute::Dim,
            TransitionKind::Zoom => Attribute::Bold,
        };
        let (prev, next) = if self.controls_visible {
            ("‹ ", " ›")
        } else {
            ("  ", "  ")
        };
        queue!(
            self.out,
            MoveTo(0, self.band.slide_row()),
            Clear(ClearType::CurrentLine),
            Print(prev),
            SetAttribute(style),
            Print(body),
            SetAttribute(Attribute::Reset),
            Print(next)
        )?;

        queue!(
            self.out,
            MoveTo(0, self.band.indicator_row()),
            Clear(ClearType::CurrentLine)
        )?;
        if self.indicators_visible {
            let dots: Vec<&str> = self
                .indicators
                .iter()
                .map(|on| if *on { "●" } else { "○" })
                .collect();
            queue!(
                self.out,
                MoveTo(INDICATOR_COL, self.band.indicator_row()),
                Print(dots.join(" "))
            )?;
        }
        self.out.flush()
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    fn set_slide_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.slides.get_mut(index) {
            *slot = active;
        }
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = active;
        }
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }

    fn set_indicators_visible(&mut self, visible: bool) {
        self.indicators_visible = visible;
    }

    fn set_transition(&mut self, kind: TransitionKind, _duration: Duration) {
        self.transition = kind;
    }

    fn subscribe(&mut self, source: InputSource) {
        self.subscriptions.insert(source);
    }

    fn unsubscribe(&mut self, source: InputSource) {
        self.subscriptions.remove(&source);
    }

    fn counter_label(&self) -> Option<TextLabel> {
        self.label.clone()
    }

    fn present(&mut self) {
        if let Err(err) = self.draw() {
            warn!(carousel = %self.name, "failed to draw carousel: {err}");
        }
    }
}

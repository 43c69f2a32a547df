//! Rendering collaborators: the surface a carousel draws on and the listener
//! notified after each render.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use crate::config::TransitionKind;
use crate::events::InputSource;

/// Everything a navigator needs from the host that draws it.
///
/// Slide identity is positional and must stay stable for the surface's
/// lifetime. Markers are toggled one element at a time; `present` is called
/// once per render after every marker and the listener have been updated.
pub trait RenderSurface {
    fn slide_count(&self) -> usize;

    fn indicator_count(&self) -> usize {
        0
    }

    fn set_slide_active(&mut self, index: usize, active: bool);

    fn set_indicator_active(&mut self, _index: usize, _active: bool) {}

    fn set_controls_visible(&mut self, _visible: bool) {}

    fn set_indicators_visible(&mut self, _visible: bool) {}

    /// Transition style and duration are cosmetic; the surface animates, the
    /// navigator only holds its lock for `duration`.
    fn set_transition(&mut self, _kind: TransitionKind, _duration: Duration) {}

    fn subscribe(&mut self, _source: InputSource) {}

    fn unsubscribe(&mut self, _source: InputSource) {}

    /// Optional text label a listener can keep in sync with the index.
    fn counter_label(&self) -> Option<TextLabel> {
        None
    }

    fn present(&mut self) {}
}

impl<T: RenderSurface + ?Sized> RenderSurface for &mut T {
    fn slide_count(&self) -> usize {
        (**self).slide_count()
    }

    fn indicator_count(&self) -> usize {
        (**self).indicator_count()
    }

    fn set_slide_active(&mut self, index: usize, active: bool) {
        (**self).set_slide_active(index, active)
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        (**self).set_indicator_active(index, active)
    }

    fn set_controls_visible(&mut self, visible: bool) {
        (**self).set_controls_visible(visible)
    }

    fn set_indicators_visible(&mut self, visible: bool) {
        (**self).set_indicators_visible(visible)
    }

    fn set_transition(&mut self, kind: TransitionKind, duration: Duration) {
        (**self).set_transition(kind, duration)
    }

    fn subscribe(&mut self, source: InputSource) {
        (**self).subscribe(source)
    }

    fn unsubscribe(&mut self, source: InputSource) {
        (**self).unsubscribe(source)
    }

    fn counter_label(&self) -> Option<TextLabel> {
        (**self).counter_label()
    }

    fn present(&mut self) {
        (**self).present()
    }
}

/// Observer invoked with the new index after every render.
pub trait IndexListener {
    fn index_changed(&mut self, index: usize);
}

impl<F> IndexListener for F
where
    F: FnMut(usize),
{
    fn index_changed(&mut self, index: usize) {
        self(index)
    }
}

/// Shared, cheaply cloned text cell. The surface reads it when drawing; a
/// listener writes it.
#[derive(Debug, Clone, Default)]
pub struct TextLabel(Rc<RefCell<String>>);

impl TextLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.0.borrow_mut() = text.into();
    }

    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }
}

/// Headless surface that only records marker state. Used by `--simulate`.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    slides: Vec<bool>,
    indicators: Vec<bool>,
    controls_visible: bool,
    indicators_visible: bool,
    transition: Option<(TransitionKind, Duration)>,
    subscriptions: BTreeSet<InputSource>,
    label: Option<TextLabel>,
    frames: usize,
}

impl MemorySurface {
    /// A surface with `slides` slides and one indicator per slide.
    pub fn new(slides: usize) -> Self {
        Self {
            slides: vec![false; slides],
            indicators: vec![false; slides],
            ..Self::default()
        }
    }

    pub fn with_indicators(mut self, count: usize) -> Self {
        self.indicators = vec![false; count];
        self
    }

    pub fn with_label(mut self) -> Self {
        self.label = Some(TextLabel::new());
        self
    }

    /// The single visible slide, or `None` if zero or several are marked.
    pub fn active_slide(&self) -> Option<usize> {
        single_active(&self.slides)
    }

    pub fn active_indicator(&self) -> Option<usize> {
        single_active(&self.indicators)
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn indicators_visible(&self) -> bool {
        self.indicators_visible
    }

    pub fn transition(&self) -> Option<(TransitionKind, Duration)> {
        self.transition
    }

    pub fn is_subscribed(&self, source: InputSource) -> bool {
        self.subscriptions.contains(&source)
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = InputSource> + '_ {
        self.subscriptions.iter().copied()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn label_text(&self) -> Option<String> {
        self.label.as_ref().map(TextLabel::get)
    }
}

fn single_active(flags: &[bool]) -> Option<usize> {
    let mut active = flags.iter().enumerate().filter(|(_, on)| **on);
    match (active.next(), active.next()) {
        (Some((idx, _)), None) => Some(idx),
        _ => None,
    }
}

impl RenderSurface for MemorySurface {
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

    fn set_transition(&mut self, kind: TransitionKind, duration: Duration) {
        self.transition = Some((kind, duration));
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
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_clones_share_text() {
        let label = TextLabel::new();
        let writer = label.clone();
        writer.set("2 of 3");
        assert_eq!(label.get(), "2 of 3");
    }

    #[test]
    fn active_slide_requires_exactly_one_marker() {
        let mut surface = MemorySurface::new(3);
        assert_eq!(surface.active_slide(), None);
        surface.set_slide_active(1, true);
        assert_eq!(surface.active_slide(), Some(1));
        surface.set_slide_active(2, true);
        assert_eq!(surface.active_slide(), None);
    }

    #[test]
    fn closures_are_listeners() {
        let mut seen = Vec::new();
        {
            let mut listener = |idx: usize| seen.push(idx);
            listener.index_changed(4);
            listener.index_changed(0);
        }
        assert_eq!(seen, vec![4, 0]);
    }
}

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::{CarouselOptions, KeyboardScope};
use crate::error::CarouselError;
use crate::events::{ChangeCause, IndexChange, InputSource, Key, NavigatorInput};
use crate::surface::{IndexListener, RenderSurface};
use crate::timer::{TaskHandle, TimerQueue, duration_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigatorTimer {
    Unlock,
    AutoplayTick,
}

/// Slide index state machine for one carousel.
///
/// Manual navigation (`next`, `prev`, `go_to`, and the inputs mapped onto
/// them) takes the transition lock for `transition-duration-ms`; calls made
/// while it is held are dropped. Autoplay ticks ignore the lock and never take
/// it. Time only moves when the host calls [`Navigator::advance`] or
/// [`Navigator::advance_to`].
pub struct Navigator<S: RenderSurface> {
    surface: S,
    listener: Option<Box<dyn IndexListener>>,
    options: CarouselOptions,
    slide_count: usize,
    current: usize,
    transitioning: bool,
    hovered: bool,
    timers: TimerQueue<NavigatorTimer>,
    autoplay: Option<TaskHandle>,
    subscriptions: Vec<InputSource>,
}

impl<S: RenderSurface> Navigator<S> {
    pub fn new(surface: S, options: CarouselOptions) -> Result<Self, CarouselError> {
        Self::build(surface, options, None)
    }

    pub fn with_listener<L>(
        surface: S,
        options: CarouselOptions,
        listener: L,
    ) -> Result<Self, CarouselError>
    where
        L: IndexListener + 'static,
    {
        Self::build(surface, options, Some(Box::new(listener)))
    }

    fn build(
        mut surface: S,
        options: CarouselOptions,
        listener: Option<Box<dyn IndexListener>>,
    ) -> Result<Self, CarouselError> {
        let slide_count = surface.slide_count();
        if slide_count == 0 {
            return Err(CarouselError::NoSlides);
        }

        let indicators = options.show_indicators && surface.indicator_count() > 0;
        surface.set_transition(options.transition, options.transition_duration());
        surface.set_controls_visible(options.show_controls);
        surface.set_indicators_visible(indicators);

        let mut subscriptions = Vec::with_capacity(5);
        if options.show_controls {
            subscriptions.extend([InputSource::PrevTrigger, InputSource::NextTrigger]);
        }
        if indicators {
            subscriptions.push(InputSource::Indicators);
        }
        subscriptions.extend([InputSource::Keyboard, InputSource::Pointer]);
        for source in &subscriptions {
            surface.subscribe(*source);
        }

        let mut navigator = Self {
            surface,
            listener,
            options,
            slide_count,
            current: 0,
            transitioning: false,
            hovered: false,
            timers: TimerQueue::new(),
            autoplay: None,
            subscriptions,
        };
        navigator.render(0);
        if navigator.options.autoplay {
            navigator.start_autoplay();
        }
        debug!(
            slides = slide_count,
            transition = %navigator.options.transition,
            autoplay = navigator.options.autoplay,
            "carousel initialized"
        );
        Ok(navigator)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_autoplay_active(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn next(&mut self) -> Option<IndexChange> {
        if self.transitioning {
            trace!("next ignored during transition");
            return None;
        }
        let to = (self.current + 1) % self.slide_count;
        Some(self.navigate(to, ChangeCause::Next))
    }

    pub fn prev(&mut self) -> Option<IndexChange> {
        if self.transitioning {
            trace!("prev ignored during transition");
            return None;
        }
        let to = (self.current + self.slide_count - 1) % self.slide_count;
        Some(self.navigate(to, ChangeCause::Prev))
    }

    /// Jumps to `index`. Out-of-range indices are dropped with a warning.
    pub fn go_to(&mut self, index: usize) -> Option<IndexChange> {
        if self.transitioning || index == self.current {
            return None;
        }
        if index >= self.slide_count {
            warn!(
                index,
                slides = self.slide_count,
                "ignoring out-of-range slide index"
            );
            return None;
        }
        Some(self.navigate(index, ChangeCause::GoTo))
    }

    /// Arms the repeating autoplay task unless it is already armed.
    pub fn start_autoplay(&mut self) {
        if self.autoplay.is_some() {
            return;
        }
        let handle = self
            .timers
            .schedule_repeating(self.options.autoplay_interval(), NavigatorTimer::AutoplayTick);
        self.autoplay = Some(handle);
        debug!(
            interval_ms = self.options.autoplay_interval_ms,
            "autoplay armed"
        );
    }

    pub fn pause_autoplay(&mut self) {
        if let Some(handle) = self.autoplay.take() {
            self.timers.cancel(handle);
            debug!("autoplay paused");
        }
    }

    pub fn handle_input(&mut self, input: NavigatorInput) -> Option<IndexChange> {
        if !self.subscriptions.contains(&InputSource::of(&input)) {
            trace!(?input, "input from unsubscribed source");
            return None;
        }
        match input {
            NavigatorInput::Key(Key::ArrowLeft) if self.accepts_keys() => self.prev(),
            NavigatorInput::Key(Key::ArrowRight) if self.accepts_keys() => self.next(),
            NavigatorInput::Key(_) => None,
            NavigatorInput::PrevTrigger => self.prev(),
            NavigatorInput::NextTrigger => self.next(),
            NavigatorInput::Indicator(index) => self.go_to(index),
            NavigatorInput::PointerEnter => {
                self.hovered = true;
                self.pause_autoplay();
                None
            }
            NavigatorInput::PointerLeave => {
                self.hovered = false;
                if self.options.autoplay {
                    self.start_autoplay();
                }
                None
            }
        }
    }

    /// Virtual time since construction.
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.timers.now_ms())
    }

    /// Earliest pending task deadline on the virtual clock.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline_ms().map(Duration::from_millis)
    }

    /// Returns the autoplay changes made while time moved, oldest first.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<IndexChange> {
        let until = self.timers.now_ms().saturating_add(duration_ms(elapsed));
        self.run_until(until)
    }

    /// Moves the virtual clock to `now`, firing every task due on the way.
    /// Every missed autoplay tick fires, so a long jump renders once per tick.
    /// Moving backwards is a no-op.
    pub fn advance_to(&mut self, now: Duration) -> Vec<IndexChange> {
        self.run_until(duration_ms(now))
    }

    /// Cancels autoplay, releases every subscription, and hands the surface back.
    pub fn destroy(mut self) -> S {
        self.pause_autoplay();
        for source in self.subscriptions.drain(..) {
            self.surface.unsubscribe(source);
        }
        debug!(index = self.current, "carousel destroyed");
        self.surface
    }

    fn accepts_keys(&self) -> bool {
        match self.options.keyboard_scope {
            KeyboardScope::Global => true,
            KeyboardScope::Hovered => self.hovered,
        }
    }

    fn navigate(&mut self, to: usize, cause: ChangeCause) -> IndexChange {
        let from = self.current;
        self.transitioning = true;
        self.current = to;
        self.render(to);
        self.timers
            .schedule_once(self.options.transition_duration(), NavigatorTimer::Unlock);
        debug!(from, to, ?cause, "slide changed");
        IndexChange { from, to, cause }
    }

    fn run_until(&mut self, until_ms: u64) -> Vec<IndexChange> {
        let mut changes = Vec::new();
        while let Some(fired) = self.timers.pop_due(until_ms) {
            match fired.payload {
                NavigatorTimer::Unlock => self.transitioning = false,
                NavigatorTimer::AutoplayTick => {
                    let from = self.current;
                    self.current = (from + 1) % self.slide_count;
                    self.render(self.current);
                    trace!(from, to = self.current, at_ms = fired.at_ms, "autoplay advanced");
                    changes.push(IndexChange {
                        from,
                        to: self.current,
                        cause: ChangeCause::Autoplay,
                    });
                }
            }
        }
        self.timers.settle(until_ms);
        changes
    }

    fn render(&mut self, index: usize) {
        for slide in 0..self.slide_count {
            self.surface.set_slide_active(slide, slide == index);
        }
        for indicator in 0..self.surface.indicator_count() {
            self.surface.set_indicator_active(indicator, indicator == index);
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.index_changed(index);
        }
        self.surface.present();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::TransitionKind;
    use crate::surface::MemorySurface;

    fn manual() -> CarouselOptions {
        CarouselOptions {
            autoplay: false,
            ..CarouselOptions::default()
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<usize>>>, impl FnMut(usize) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |idx| sink.borrow_mut().push(idx))
    }

    #[test]
    fn construction_renders_first_slide_and_forwards_style() {
        let opts = CarouselOptions {
            transition: TransitionKind::Zoom,
            transition_duration_ms: 300,
            ..manual()
        };
        let nav = Navigator::new(MemorySurface::new(3), opts).unwrap();
        let surface = nav.surface();
        assert_eq!(surface.active_slide(), Some(0));
        assert_eq!(surface.active_indicator(), Some(0));
        assert_eq!(
            surface.transition(),
            Some((TransitionKind::Zoom, Duration::from_millis(300)))
        );
        assert_eq!(surface.frames(), 1);
        assert!(!nav.is_autoplay_active());
    }

    #[test]
    fn zero_slides_fails_without_touching_surface() {
        let err = Navigator::new(MemorySurface::new(0), manual()).err();
        assert_eq!(err, Some(CarouselError::NoSlides));
    }

    #[test]
    fn indicator_click_jumps_and_locks() {
        let mut nav = Navigator::new(MemorySurface::new(5), manual()).unwrap();
        let change = nav.handle_input(NavigatorInput::Indicator(3)).unwrap();
        assert_eq!((change.from, change.to, change.cause), (0, 3, ChangeCause::GoTo));
        assert!(nav.is_transitioning());
        assert_eq!(nav.surface().active_indicator(), Some(3));
        assert!(nav.handle_input(NavigatorInput::Indicator(1)).is_none());
    }

    #[test]
    fn out_of_range_go_to_is_ignored() {
        let mut nav = Navigator::new(MemorySurface::new(2), manual()).unwrap();
        assert!(nav.go_to(7).is_none());
        assert_eq!(nav.current_index(), 0);
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn hidden_controls_drop_trigger_input() {
        let opts = CarouselOptions {
            show_controls: false,
            show_indicators: false,
            ..manual()
        };
        let mut nav = Navigator::new(MemorySurface::new(3), opts).unwrap();
        assert!(!nav.surface().controls_visible());
        assert!(!nav.surface().indicators_visible());
        assert!(nav.handle_input(NavigatorInput::NextTrigger).is_none());
        assert!(nav.handle_input(NavigatorInput::Indicator(2)).is_none());
        assert!(
            nav.handle_input(NavigatorInput::Key(Key::ArrowRight))
                .is_some()
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut nav = Navigator::new(MemorySurface::new(3), manual()).unwrap();
        assert!(nav.handle_input(NavigatorInput::Key(Key::Other)).is_none());
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn hovered_scope_needs_pointer_inside() {
        let opts = CarouselOptions {
            keyboard_scope: KeyboardScope::Hovered,
            ..manual()
        };
        let mut nav = Navigator::new(MemorySurface::new(3), opts).unwrap();
        assert!(nav.handle_input(NavigatorInput::Key(Key::ArrowRight)).is_none());
        nav.handle_input(NavigatorInput::PointerEnter);
        assert_eq!(
            nav.handle_input(NavigatorInput::Key(Key::ArrowRight))
                .map(|c| c.to),
            Some(1)
        );
    }

    #[test]
    fn hover_pauses_and_leave_resumes_configured_autoplay() {
        let opts = CarouselOptions {
            autoplay_interval_ms: 1000,
            ..CarouselOptions::default()
        };
        let (seen, listener) = recorder();
        let mut nav = Navigator::with_listener(MemorySurface::new(3), opts, listener).unwrap();
        seen.borrow_mut().clear();

        nav.handle_input(NavigatorInput::PointerEnter);
        assert!(!nav.is_autoplay_active());
        nav.advance(Duration::from_millis(5000));
        assert!(seen.borrow().is_empty());

        nav.handle_input(NavigatorInput::PointerLeave);
        assert!(nav.is_autoplay_active());
        nav.advance(Duration::from_millis(1000));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn leave_does_not_start_autoplay_that_was_never_enabled() {
        let mut nav = Navigator::new(MemorySurface::new(3), manual()).unwrap();
        nav.handle_input(NavigatorInput::PointerEnter);
        nav.handle_input(NavigatorInput::PointerLeave);
        assert!(!nav.is_autoplay_active());
    }

    #[test]
    fn autoplay_ticks_ignore_the_lock() {
        let opts = CarouselOptions {
            autoplay_interval_ms: 1000,
            transition_duration_ms: 5000,
            ..CarouselOptions::default()
        };
        let mut nav = Navigator::new(MemorySurface::new(4), opts).unwrap();
        nav.advance(Duration::from_millis(900));
        nav.next();
        assert_eq!(nav.current_index(), 1);
        nav.advance(Duration::from_millis(100));
        assert_eq!(nav.current_index(), 2);
        assert!(nav.is_transitioning());
    }

    #[test]
    fn autoplay_ticks_report_their_changes() {
        let opts = CarouselOptions {
            autoplay_interval_ms: 1000,
            ..CarouselOptions::default()
        };
        let mut nav = Navigator::new(MemorySurface::new(2), opts).unwrap();
        assert!(nav.advance(Duration::from_millis(999)).is_empty());
        let changes = nav.advance(Duration::from_millis(1001));
        assert_eq!(
            changes,
            vec![
                IndexChange { from: 0, to: 1, cause: ChangeCause::Autoplay },
                IndexChange { from: 1, to: 0, cause: ChangeCause::Autoplay },
            ]
        );
        assert!(nav.next().is_some());
        assert!(nav.advance(Duration::from_millis(500)).is_empty());
    }

    #[test]
    fn zero_duration_lock_holds_until_time_is_advanced() {
        let opts = CarouselOptions {
            transition_duration_ms: 0,
            ..manual()
        };
        let mut nav = Navigator::new(MemorySurface::new(3), opts).unwrap();
        assert!(nav.next().is_some());
        assert!(nav.next().is_none());
        assert!(nav.is_transitioning());
        assert_eq!(nav.current_index(), 1);

        nav.advance(Duration::ZERO);
        assert!(!nav.is_transitioning());
        assert!(nav.next().is_some());
        assert_eq!(nav.current_index(), 2);
    }

    #[test]
    fn destroy_releases_everything() {
        let opts = CarouselOptions::default();
        let nav = Navigator::new(MemorySurface::new(2), opts).unwrap();
        assert!(nav.surface().is_subscribed(InputSource::Keyboard));
        assert!(nav.surface().is_subscribed(InputSource::Indicators));
        let surface = nav.destroy();
        assert_eq!(surface.subscriptions().count(), 0);
    }

    #[test]
    fn next_deadline_tracks_pending_tasks() {
        let mut nav = Navigator::new(MemorySurface::new(3), manual()).unwrap();
        assert_eq!(nav.next_deadline(), None);
        nav.advance(Duration::from_millis(40));
        nav.next();
        assert_eq!(nav.next_deadline(), Some(Duration::from_millis(540)));
        nav.advance_to(Duration::from_millis(540));
        assert!(!nav.is_transitioning());
        assert_eq!(nav.next_deadline(), None);
    }
}

/// Keys the navigator understands; everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Input addressed to a single carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorInput {
    Key(Key),
    PrevTrigger,
    NextTrigger,
    Indicator(usize),
    PointerEnter,
    PointerLeave,
}

/// Sources a navigator subscribes to on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputSource {
    PrevTrigger,
    NextTrigger,
    Indicators,
    Keyboard,
    Pointer,
}

impl InputSource {
    pub fn of(input: &NavigatorInput) -> Self {
        match input {
            NavigatorInput::Key(_) => Self::Keyboard,
            NavigatorInput::PrevTrigger => Self::PrevTrigger,
            NavigatorInput::NextTrigger => Self::NextTrigger,
            NavigatorInput::Indicator(_) => Self::Indicators,
            NavigatorInput::PointerEnter | NavigatorInput::PointerLeave => Self::Pointer,
        }
    }
}

/// Why the index moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    Next,
    Prev,
    GoTo,
    Autoplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub from: usize,
    pub to: usize,
    pub cause: ChangeCause,
}

/// Input produced by a host (terminal, test harness) for the driver task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Page-wide key press, delivered to every mounted carousel.
    Key(Key),
    /// Input for one carousel, by mount order.
    Widget { id: usize, input: NavigatorInput },
}

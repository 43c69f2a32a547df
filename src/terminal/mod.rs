//! Terminal host for the `carousel` binary: lifecycle, input translation,
//! and the crossterm-backed surface.

pub mod layout;
mod surface;

use std::io;
use std::panic;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use layout::Layout;
pub use surface::TerminalSurface;

use crate::events::{HostEvent, Key, NavigatorInput};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Raw mode, alternate screen, and mouse capture for the life of the value.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        install_panic_hook();
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )
        .context("failed to enter alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal() {
            warn!("failed to restore terminal: {err:#}");
        }
    }
}

fn restore_terminal() -> Result<()> {
    if let Err(err) = execute!(io::stdout(), DisableMouseCapture, Show) {
        warn!("failed to release mouse capture: {err}");
    }
    execute!(io::stdout(), LeaveAlternateScreen).context("failed to leave alternate screen")?;
    disable_raw_mode().context("failed to disable raw mode")?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// What one terminal event means for the carousels.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Translated {
    pub events: Vec<HostEvent>,
    pub quit: bool,
}

/// Tracks which carousel the pointer is over so movement becomes
/// enter/leave pairs.
#[derive(Debug, Default)]
pub struct InputTranslator {
    hovered: Option<usize>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &Event, layout: &Layout) -> Translated {
        let mut out = Translated::default();
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Left => out.events.push(HostEvent::Key(Key::ArrowLeft)),
                KeyCode::Right => out.events.push(HostEvent::Key(Key::ArrowRight)),
                KeyCode::Esc | KeyCode::Char('q') => out.quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    out.quit = true
                }
                _ => out.events.push(HostEvent::Key(Key::Other)),
            },
            Event::Mouse(mouse) => {
                let over = layout.widget_at(mouse.row);
                if over != self.hovered {
                    if let Some(id) = self.hovered {
                        out.events.push(HostEvent::Widget {
                            id,
                            input: NavigatorInput::PointerLeave,
                        });
                    }
                    if let Some(id) = over {
                        out.events.push(HostEvent::Widget {
                            id,
                            input: NavigatorInput::PointerEnter,
                        });
                    }
                    self.hovered = over;
                }
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    if let Some((id, input)) = layout.hit_test(mouse.column, mouse.row) {
                        out.events.push(HostEvent::Widget { id, input });
                    }
                }
            }
            _ => {}
        }
        out
    }
}

/// Blocking reader loop: polls crossterm, translates, and forwards to the
/// driver until cancelled, asked to quit, or the driver goes away.
pub fn read_input(layout: Layout, to_driver: Sender<HostEvent>, cancel: CancellationToken) {
    let mut translator = InputTranslator::new();
    while !cancel.is_cancelled() {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => {
                warn!("terminal poll failed: {err}");
                break;
            }
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                warn!("terminal read failed: {err}");
                break;
            }
        };
        let translated = translator.translate(&event, &layout);
        for host_event in translated.events {
            if to_driver.blocking_send(host_event).is_err() {
                debug!("driver gone; stopping input reader");
                return;
            }
        }
        if translated.quit {
            debug!("quit requested from terminal");
            break;
        }
    }
    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, MouseEvent};

    use super::*;

    fn layout() -> Layout {
        let mut layout = Layout::new(30);
        layout.push(3);
        layout.push(2);
        layout
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn arrows_become_page_wide_keys() {
        let mut t = InputTranslator::new();
        let out = t.translate(
            &Event::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)),
            &layout(),
        );
        assert_eq!(out.events, vec![HostEvent::Key(Key::ArrowRight)]);
        assert!(!out.quit);
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut t = InputTranslator::new();
        let q = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(t.translate(&q, &layout()).quit);
        assert!(t.translate(&ctrl_c, &layout()).quit);
    }

    #[test]
    fn moving_between_bands_emits_leave_then_enter() {
        let mut t = InputTranslator::new();
        let layout = layout();
        let first = t.translate(&mouse(MouseEventKind::Moved, 5, 1), &layout);
        assert_eq!(
            first.events,
            vec![HostEvent::Widget {
                id: 0,
                input: NavigatorInput::PointerEnter
            }]
        );
        assert!(t.translate(&mouse(MouseEventKind::Moved, 6, 2), &layout).events.is_empty());
        let second = t.translate(&mouse(MouseEventKind::Moved, 5, 5), &layout);
        assert_eq!(
            second.events,
            vec![
                HostEvent::Widget {
                    id: 0,
                    input: NavigatorInput::PointerLeave
                },
                HostEvent::Widget {
                    id: 1,
                    input: NavigatorInput::PointerEnter
                },
            ]
        );
    }

    #[test]
    fn click_on_indicator_targets_that_carousel() {
        let mut t = InputTranslator::new();
        let out = t.translate(
            &mouse(MouseEventKind::Down(MouseButton::Left), 4, 6),
            &layout(),
        );
        assert_eq!(
            out.events,
            vec![
                HostEvent::Widget {
                    id: 1,
                    input: NavigatorInput::PointerEnter
                },
                HostEvent::Widget {
                    id: 1,
                    input: NavigatorInput::Indicator(1)
                },
            ]
        );
    }
}

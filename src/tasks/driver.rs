use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::bootstrap::Mounted;
use crate::events::{HostEvent, NavigatorInput};
use crate::surface::RenderSurface;

const IDLE_WAIT: Duration = Duration::from_secs(60);

/// Runs every mounted carousel on the current task until `cancel` fires or
/// the input channel closes, then destroys them and returns their surfaces.
///
/// Rules:
/// - Each navigator's virtual clock is synced to wall time elapsed since the
///   driver started, before any input is handled.
/// - The loop sleeps until the earliest pending navigator deadline.
/// - A late wake (host suspended, timer slack) replays every missed autoplay
///   tick in one pass, so each carousel lands where uninterrupted time would
///   have left it.
/// - Key events reach every carousel; widget events reach one, by mount order.
///
/// Navigators hold non-`Send` listeners, so this future is awaited in place
/// rather than spawned.
pub async fn run<S: RenderSurface>(
    mut widgets: Vec<Mounted<S>>,
    mut input: Receiver<HostEvent>,
    cancel: CancellationToken,
) -> Result<Vec<S>> {
    let start = Instant::now();
    info!(carousels = widgets.len(), "carousel driver started");

    loop {
        let wake = widgets
            .iter()
            .filter_map(|w| w.navigator.next_deadline())
            .min()
            .map(|deadline| start + deadline)
            .unwrap_or_else(|| Instant::now() + IDLE_WAIT);

        select! {
            _ = cancel.cancelled() => break,

            maybe_ev = input.recv() => {
                sync(&mut widgets, start.elapsed());
                match maybe_ev {
                    Some(event) => dispatch(&mut widgets, event),
                    None => {
                        debug!("host input closed; stopping driver");
                        break;
                    }
                }
            }

            _ = sleep_until(wake) => {
                sync(&mut widgets, start.elapsed());
            }
        }
    }

    info!("carousel driver stopping");
    Ok(widgets
        .into_iter()
        .map(|mounted| mounted.navigator.destroy())
        .collect())
}

fn sync<S: RenderSurface>(widgets: &mut [Mounted<S>], elapsed: Duration) {
    for mounted in widgets.iter_mut() {
        let changes = mounted.navigator.advance_to(elapsed);
        if changes.len() > 1 {
            debug!(carousel = %mounted.name, ticks = changes.len(), "replayed missed autoplay ticks");
        }
        for change in changes {
            trace!(carousel = %mounted.name, from = change.from, to = change.to, "autoplay moved slide");
        }
    }
}

fn dispatch<S: RenderSurface>(widgets: &mut [Mounted<S>], event: HostEvent) {
    match event {
        HostEvent::Key(key) => {
            for mounted in widgets.iter_mut() {
                mounted.navigator.handle_input(NavigatorInput::Key(key));
            }
        }
        HostEvent::Widget { id, input } => match widgets.get_mut(id) {
            Some(mounted) => {
                if let Some(change) = mounted.navigator.handle_input(input) {
                    debug!(carousel = %mounted.name, from = change.from, to = change.to, "input moved slide");
                }
            }
            None => warn!(id, ?input, "input for unknown carousel"),
        },
    }
}

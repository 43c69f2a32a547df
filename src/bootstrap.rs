//! Page-level startup: find marked containers and mount a navigator on each.

use tracing::{info, warn};

use crate::config::{CarouselOptions, Configuration, ContainerConfig};
use crate::error::CarouselError;
use crate::navigator::Navigator;
use crate::surface::{RenderSurface, TextLabel};

/// Attribute that opts a container into mounting.
pub const MARKER_ATTR: &str = "carousel";
pub const TRANSITION_ATTR: &str = "transition";
pub const INTERVAL_ATTR: &str = "autoplay-interval";
pub const AUTOPLAY_ATTR: &str = "autoplay";

pub struct Mounted<S: RenderSurface> {
    pub name: String,
    pub navigator: Navigator<S>,
}

pub fn is_marked(container: &ContainerConfig) -> bool {
    container.attributes.contains_key(MARKER_ATTR)
}

/// Layers a container's data attributes over `defaults`. Values that fail to
/// parse are logged and skipped.
pub fn options_for(defaults: &CarouselOptions, container: &ContainerConfig) -> CarouselOptions {
    let mut options = defaults.clone();
    let attrs = &container.attributes;

    if let Some(raw) = attrs.get(TRANSITION_ATTR) {
        match raw.parse() {
            Ok(kind) => options.transition = kind,
            Err(err) => warn!(container = %container.name, "{err:#}"),
        }
    }
    if let Some(raw) = attrs.get(INTERVAL_ATTR) {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => options.autoplay_interval_ms = ms,
            _ => warn!(
                container = %container.name,
                value = %raw,
                "ignoring invalid autoplay interval"
            ),
        }
    }
    if let Some(raw) = attrs.get(AUTOPLAY_ATTR) {
        match raw.trim() {
            "true" | "" => options.autoplay = true,
            "false" => options.autoplay = false,
            other => warn!(
                container = %container.name,
                value = other,
                "ignoring invalid autoplay flag"
            ),
        }
    }
    options
}

/// Listener that keeps `label` reading "{index+1} of {count}".
pub fn counter_listener(label: TextLabel, count: usize) -> impl FnMut(usize) + 'static {
    move |index| label.set(format!("{} of {}", index + 1, count))
}

/// Mounts one container. `make_surface` returns `None` when the container has
/// no rendering root.
pub fn mount<S, F>(
    container: &ContainerConfig,
    defaults: &CarouselOptions,
    make_surface: F,
) -> Result<Navigator<S>, CarouselError>
where
    S: RenderSurface,
    F: FnOnce(&ContainerConfig) -> Option<S>,
{
    let surface = make_surface(container).ok_or_else(|| CarouselError::MissingRoot {
        name: container.name.clone(),
    })?;
    let options = options_for(defaults, container);
    match surface.counter_label() {
        Some(label) => {
            let count = surface.slide_count();
            Navigator::with_listener(surface, options, counter_listener(label, count))
        }
        None => Navigator::new(surface, options),
    }
}

/// Mounts every marked container independently. Failures are reported and
/// the container is skipped; the rest still mount.
pub fn mount_all<S, F>(config: &Configuration, mut make_surface: F) -> Vec<Mounted<S>>
where
    S: RenderSurface,
    F: FnMut(&ContainerConfig) -> Option<S>,
{
    let mut mounted = Vec::new();
    for container in config.containers.iter().filter(|c| is_marked(c)) {
        match mount(container, &config.defaults, &mut make_surface) {
            Ok(navigator) => {
                info!(
                    container = %container.name,
                    slides = navigator.slide_count(),
                    transition = %navigator.options().transition,
                    "carousel mounted"
                );
                mounted.push(Mounted {
                    name: container.name.clone(),
                    navigator,
                });
            }
            Err(err) => warn!(container = %container.name, "carousel not mounted: {err}"),
        }
    }
    mounted
}

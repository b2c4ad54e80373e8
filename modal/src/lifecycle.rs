//! The show/hide lifecycle a modal delegates visual transitions to.

use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::dom::Dom;

/// Generic setup/show/hide/destroy contract.
///
/// `show` and `hide` flip the active state when called and return a future
/// that resolves once the visual transition has finished.
pub trait Lifecycle: 'static {
    /// Called before every show. Does nothing by default.
    fn setup(&mut self) {}

    fn show(&mut self) -> LocalBoxFuture<'static, ()>;

    fn hide(&mut self) -> LocalBoxFuture<'static, ()>;

    fn destroy(&mut self);

    fn is_active(&self) -> bool;
}

/// Lifecycle that completes after the element's CSS transition.
pub struct TransitionLifecycle<D: Dom> {
    dom: D,
    el: D::Node,
    active: bool,
}

impl<D: Dom> TransitionLifecycle<D> {
    pub fn new(dom: D, el: D::Node) -> Self {
        Self {
            dom,
            el,
            active: false,
        }
    }
}

impl<D: Dom> Lifecycle for TransitionLifecycle<D> {
    fn show(&mut self) -> LocalBoxFuture<'static, ()> {
        self.active = true;
        self.dom.wait_for_transition(&self.el)
    }

    fn hide(&mut self) -> LocalBoxFuture<'static, ()> {
        self.active = false;
        self.dom.wait_for_transition(&self.el)
    }

    fn destroy(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Parse a CSS `<time>` list such as `"0.3s, 150ms"` and return the longest
/// entry. Unparseable or negative entries count as zero.
pub fn parse_css_time(value: &str) -> Duration {
    value
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let seconds = if let Some(ms) = entry.strip_suffix("ms") {
                ms.trim().parse::<f64>().ok()? / 1000.0
            } else {
                entry.strip_suffix('s')?.trim().parse::<f64>().ok()?
            };
            Duration::try_from_secs_f64(seconds).ok()
        })
        .max()
        .unwrap_or(Duration::ZERO)
}

use crate::page::{translate_y, Page};
use std::{cell::Cell, rc::Rc};

pub const ANCHOR_LINK_SELECTOR: &str = "a[href^=\"#\"]";
pub const HEADER_SELECTOR: &str = ".header";
pub const PARALLAX_SELECTOR: &str = ".hero-gradient";

const HEADER_HIDDEN_TRANSFORM: &str = "translateY(-100%)";
const HEADER_RESTING_TRANSFORM: &str = "translateY(0)";
const HEADER_TINTED_BACKGROUND: &str = "rgba(255, 255, 255, 0.98)";
const HEADER_TINTED_SHADOW: &str = "0 2px 10px rgba(0,0,0,0.1)";
const HEADER_RESTING_BACKGROUND: &str = "rgba(255, 255, 255, 0.95)";
const HEADER_RESTING_SHADOW: &str = "0 2px 4px rgba(0,0,0,0.08)";

// `None` for the bare `#` sentinel and for anything that is not a fragment.
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub struct SmoothScroll<P: Page> {
    page: Rc<P>,
    header_offset: f64,
}

impl<P: Page> SmoothScroll<P> {
    pub fn new(page: Rc<P>, header_offset: f64) -> Self {
        Self {
            page,
            header_offset,
        }
    }

    pub fn links(&self) -> Vec<P::Element> {
        self.page.query_all(ANCHOR_LINK_SELECTOR)
    }

    // true when the browser's default jump should be suppressed
    pub fn on_link_click(&self, link: &P::Element) -> bool {
        let Some(href) = self.page.attribute(link, "href") else {
            return false;
        };
        if !href.starts_with('#') {
            return false;
        }

        if let Some(target) = anchor_target(&href).and_then(|id| self.page.element_by_id(id)) {
            let top = self.page.bounding_rect(&target).top + self.page.scroll_y();
            self.page.scroll_to_smooth(top - self.header_offset);
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderState {
    pub hidden: bool,
    pub tinted: bool,
}

impl HeaderState {
    pub fn resolve(previous: f64, current: f64, hide_after: f64, tint_after: f64) -> Self {
        Self {
            hidden: current > previous && current > hide_after,
            tinted: current > tint_after,
        }
    }
}

pub struct HeaderEffect<P: Page> {
    page: Rc<P>,
    header: Option<P::Element>,
    last_scroll_top: Cell<f64>,
    hide_after: f64,
    tint_after: f64,
}

impl<P: Page> HeaderEffect<P> {
    pub fn new(page: Rc<P>, hide_after: f64, tint_after: f64) -> Self {
        let header = page.query(HEADER_SELECTOR);
        Self {
            page,
            header,
            last_scroll_top: Cell::new(0.0),
            hide_after,
            tint_after,
        }
    }

    pub fn on_scroll(&self) -> HeaderState {
        let current = self.page.scroll_y();
        let state = HeaderState::resolve(
            self.last_scroll_top.replace(current),
            current,
            self.hide_after,
            self.tint_after,
        );

        if let Some(header) = &self.header {
            let transform = if state.hidden {
                HEADER_HIDDEN_TRANSFORM
            } else {
                HEADER_RESTING_TRANSFORM
            };
            let (background, shadow) = if state.tinted {
                (HEADER_TINTED_BACKGROUND, HEADER_TINTED_SHADOW)
            } else {
                (HEADER_RESTING_BACKGROUND, HEADER_RESTING_SHADOW)
            };
            self.page.set_style(header, "transform", transform);
            self.page.set_style(header, "background", background);
            self.page.set_style(header, "box-shadow", shadow);
        }
        state
    }
}

pub struct Parallax<P: Page> {
    page: Rc<P>,
    layers: Vec<P::Element>,
    default_speed: f64,
}

impl<P: Page> Parallax<P> {
    pub fn new(page: Rc<P>, default_speed: f64) -> Self {
        let layers = page.query_all(PARALLAX_SELECTOR);
        Self {
            page,
            layers,
            default_speed,
        }
    }

    // `data-speed` is re-read on every scroll; blank or unparsable values
    // fall back to the default.
    fn speed(&self, layer: &P::Element) -> f64 {
        self.page
            .attribute(layer, "data-speed")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(self.default_speed)
    }

    pub fn on_scroll(&self) {
        let scrolled = self.page.scroll_y();
        for layer in &self.layers {
            let offset = -(scrolled * self.speed(layer));
            self.page.set_style(layer, "transform", &translate_y(offset));
        }
    }
}

use crate::logging::{log_event, LogLevel};
use crate::page::{css_px, Page};
use crate::timing::{Scheduler, Tick};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

pub const FADE_IN_SELECTORS: [&str; 10] = [
    ".promise-card",
    ".service-card",
    ".philosophy-card",
    ".concern-item",
    ".rec-card",
    ".program-card",
    ".article-card",
    ".diagnosis-card",
    ".testimonial-card",
    ".explanation-card",
];
pub const COUNTER_SELECTOR: &str = ".counter";
const FADE_IN_CLASS: &str = "fade-in-element";
const FADE_IN_VISIBLE_CLASS: &str = "fade-in-visible";
const COUNTER_TARGET_ATTRIBUTE: &str = "data-target";
const COUNTER_INVALID_TEXT: &str = "NaN";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    // negative shrinks the viewport from below
    pub bottom_margin: f64,
}

impl ObserverOptions {
    pub fn root_margin(&self) -> String {
        format!("0px 0px {} 0px", css_px(self.bottom_margin))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
}

fn stop_observing<E: PartialEq>(observed: &RefCell<Vec<E>>, element: &E) -> bool {
    let mut observed = observed.borrow_mut();
    let before = observed.len();
    observed.retain(|candidate| candidate != element);
    observed.len() != before
}

pub struct FadeIn<P: Page> {
    page: Rc<P>,
    options: ObserverOptions,
    observed: RefCell<Vec<P::Element>>,
}

impl<P: Page> FadeIn<P> {
    pub fn new(page: Rc<P>, options: ObserverOptions) -> Self {
        let mut observed = Vec::new();
        for selector in FADE_IN_SELECTORS {
            for element in page.query_all(selector) {
                page.set_class(&element, FADE_IN_CLASS, true);
                if !observed.contains(&element) {
                    observed.push(element);
                }
            }
        }
        Self {
            page,
            options,
            observed: RefCell::new(observed),
        }
    }

    pub fn targets(&self) -> Vec<P::Element> {
        self.observed.borrow().clone()
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    // Returns the elements revealed by this batch; they are no longer observed.
    pub fn on_entries(&self, entries: &[VisibilityEntry<P::Element>]) -> Vec<P::Element> {
        let mut revealed = Vec::new();
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            if stop_observing(&self.observed, &entry.target) {
                self.page.set_class(&entry.target, FADE_IN_VISIBLE_CLASS, true);
                revealed.push(entry.target.clone());
            }
        }
        revealed
    }
}

/// Reads `raw` the way `parseInt(raw)` does: leading whitespace, an optional
/// sign, then decimal digits or a `0x` hex prefix. `None` stands for `NaN`.
pub fn parse_target(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |total, digit| total * f64::from(radix) + f64::from(digit));
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CounterStep {
    Show(f64),
    Done(f64),
}

// Linear count-up from zero; the last step always lands on the exact target.
#[derive(Clone, Debug)]
pub struct CounterRun {
    current: f64,
    target: f64,
    increment: f64,
}

impl CounterRun {
    pub fn new(target: f64, duration_ms: u32, tick_ms: u32) -> Self {
        let steps = f64::from(duration_ms) / f64::from(tick_ms.max(1));
        Self {
            current: 0.0,
            target,
            increment: target / steps,
        }
    }

    pub fn step(&mut self) -> CounterStep {
        self.current += self.increment;
        if self.current >= self.target {
            CounterStep::Done(self.target)
        } else {
            CounterStep::Show(self.current.floor())
        }
    }
}

pub struct Counters<P: Page, S: Scheduler> {
    page: Rc<P>,
    scheduler: Rc<S>,
    options: ObserverOptions,
    observed: RefCell<Vec<P::Element>>,
    duration_ms: u32,
    tick_ms: u32,
    log_level: LogLevel,
}

impl<P: Page + 'static, S: Scheduler> Counters<P, S> {
    pub fn new(
        page: Rc<P>,
        scheduler: Rc<S>,
        options: ObserverOptions,
        duration_ms: u32,
        tick_ms: u32,
        log_level: LogLevel,
    ) -> Self {
        let observed = page.query_all(COUNTER_SELECTOR);
        Self {
            page,
            scheduler,
            options,
            observed: RefCell::new(observed),
            duration_ms,
            tick_ms,
            log_level,
        }
    }

    pub fn targets(&self) -> Vec<P::Element> {
        self.observed.borrow().clone()
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    pub fn on_entries(&self, entries: &[VisibilityEntry<P::Element>]) -> Vec<P::Element> {
        let mut started = Vec::new();
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            if stop_observing(&self.observed, &entry.target) {
                self.start(&entry.target);
                started.push(entry.target.clone());
            }
        }
        started
    }

    fn start(&self, element: &P::Element) {
        let raw = self
            .page
            .attribute(element, COUNTER_TARGET_ATTRIBUTE)
            .unwrap_or_default();
        let Some(target) = parse_target(&raw) else {
            self.page.set_text(element, COUNTER_INVALID_TEXT);
            return;
        };

        let mut run = CounterRun::new(target, self.duration_ms, self.tick_ms);
        let page = Rc::clone(&self.page);
        let element = element.clone();
        let log_level = self.log_level;
        self.scheduler.set_interval(
            self.tick_ms,
            Box::new(move || match run.step() {
                CounterStep::Show(value) => {
                    page.set_text(&element, &value.to_string());
                    Tick::Continue
                }
                CounterStep::Done(value) => {
                    page.set_text(&element, &value.to_string());
                    log_event(
                        log_level,
                        LogLevel::Debug,
                        "counter_completed",
                        json!({ "target": value }),
                    );
                    Tick::Stop
                }
            }),
        );
    }
}

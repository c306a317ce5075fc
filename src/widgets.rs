use crate::logging::{log_event, LogLevel};
use crate::page::{css_px, Page};
use crate::timing::Scheduler;
use serde::Serialize;
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

pub const TOOLTIP_SELECTOR: &str = "[data-tooltip]";
pub const PRELOADER_SELECTOR: &str = ".preloader";
pub const CONTACT_FORM_SELECTOR: &str = ".contact-form";
pub const TYPEWRITER_SELECTOR: &str = ".hero-title .title-main";
pub const SUCCESS_MESSAGE_TEXT: &str =
    "お問い合わせありがとうございます。折り返しご連絡させていただきます。";
const TOOLTIP_TEXT_ATTRIBUTE: &str = "data-tooltip";

// At most one open label per owner.
pub struct Tooltips<P: Page> {
    page: Rc<P>,
    gap: f64,
    open: RefCell<Vec<(P::Element, P::Element)>>,
}

impl<P: Page> Tooltips<P> {
    pub fn new(page: Rc<P>, gap: f64) -> Self {
        Self {
            page,
            gap,
            open: RefCell::new(Vec::new()),
        }
    }

    pub fn targets(&self) -> Vec<P::Element> {
        self.page.query_all(TOOLTIP_SELECTOR)
    }

    #[cfg(test)]
    pub fn open_count(&self) -> usize {
        self.open.borrow().len()
    }

    pub fn on_pointer_enter(&self, owner: &P::Element) {
        self.on_pointer_leave(owner);

        let Some(text) = self.page.attribute(owner, TOOLTIP_TEXT_ATTRIBUTE) else {
            return;
        };
        let Some(body) = self.page.body() else {
            return;
        };
        let Some(label) = self.page.create_element("div") else {
            return;
        };
        self.page.set_class(&label, "tooltip", true);
        self.page.set_text(&label, &text);
        self.page.append_child(&body, &label);

        let anchor = self.page.bounding_rect(owner);
        let (label_width, label_height) = self.page.offset_size(&label);
        let left = anchor.left + anchor.width / 2.0 - label_width / 2.0;
        let top = anchor.top - label_height - self.gap;
        self.page.set_style(&label, "left", &css_px(left));
        self.page.set_style(&label, "top", &css_px(top));

        self.open.borrow_mut().push((owner.clone(), label));
    }

    pub fn on_pointer_leave(&self, owner: &P::Element) {
        let mut closed = Vec::new();
        self.open.borrow_mut().retain(|(open_owner, label)| {
            if open_owner == owner {
                closed.push(label.clone());
                false
            } else {
                true
            }
        });
        for label in closed {
            self.page.remove(&label);
        }
    }
}

pub fn fade_out_preloader<P, S>(page: &Rc<P>, scheduler: &Rc<S>, delay_ms: u32) -> bool
where
    P: Page + 'static,
    S: Scheduler + 'static,
{
    let Some(preloader) = page.query(PRELOADER_SELECTOR) else {
        return false;
    };

    let page = Rc::clone(page);
    let inner_scheduler = Rc::clone(scheduler);
    scheduler.set_timeout(
        delay_ms,
        Box::new(move || {
            page.set_style(&preloader, "opacity", "0");
            inner_scheduler.set_timeout(
                delay_ms,
                Box::new(move || page.set_style(&preloader, "display", "none")),
            );
        }),
    );
    true
}

#[derive(Debug, Serialize)]
struct ContactSubmission {
    field_count: usize,
    field_names: Vec<String>,
}

impl ContactSubmission {
    fn from_fields(fields: &[(String, String)]) -> Self {
        Self {
            field_count: fields.len(),
            field_names: fields.iter().map(|(name, _)| name.clone()).collect(),
        }
    }
}

// Nothing is sent anywhere; the form is acknowledged and reset.
pub struct ContactForms<P: Page, S: Scheduler> {
    page: Rc<P>,
    scheduler: Rc<S>,
    message_ms: u32,
    log_level: LogLevel,
}

impl<P: Page + 'static, S: Scheduler> ContactForms<P, S> {
    pub fn new(page: Rc<P>, scheduler: Rc<S>, message_ms: u32, log_level: LogLevel) -> Self {
        Self {
            page,
            scheduler,
            message_ms,
            log_level,
        }
    }

    pub fn forms(&self) -> Vec<P::Element> {
        self.page.query_all(CONTACT_FORM_SELECTOR)
    }

    pub fn on_submit(&self, form: &P::Element) -> bool {
        let fields = self.page.form_fields(form);
        let submission = ContactSubmission::from_fields(&fields);
        log_event(
            self.log_level,
            LogLevel::Info,
            "contact_form_submitted",
            serde_json::to_value(&submission).unwrap_or_else(|_| json!({})),
        );

        if let Some(message) = self.page.create_element("div") {
            self.page.set_class(&message, "success-message", true);
            self.page.set_text(&message, SUCCESS_MESSAGE_TEXT);
            self.page.append_child(form, &message);

            let page = Rc::clone(&self.page);
            self.scheduler
                .set_timeout(self.message_ms, Box::new(move || page.remove(&message)));
        }

        self.page.reset_form(form);
        true
    }
}

pub fn start_typewriter<P, S>(
    page: &Rc<P>,
    scheduler: &Rc<S>,
    speed_ms: u32,
    log_level: LogLevel,
) -> bool
where
    P: Page + 'static,
    S: Scheduler + 'static,
{
    let Some(title) = page.query(TYPEWRITER_SELECTOR) else {
        return false;
    };

    let characters: Rc<[char]> = page.text(&title).chars().collect();
    page.set_text(&title, "");
    log_event(
        log_level,
        LogLevel::Debug,
        "typewriter_started",
        json!({ "length": characters.len() }),
    );
    type_next(Rc::clone(page), Rc::clone(scheduler), title, characters, 0, speed_ms);
    true
}

fn type_next<P, S>(
    page: Rc<P>,
    scheduler: Rc<S>,
    title: P::Element,
    characters: Rc<[char]>,
    index: usize,
    speed_ms: u32,
) where
    P: Page + 'static,
    S: Scheduler + 'static,
{
    let Some(character) = characters.get(index).copied() else {
        return;
    };

    let mut typed = page.text(&title);
    typed.push(character);
    page.set_text(&title, &typed);

    let next_scheduler = Rc::clone(&scheduler);
    scheduler.set_timeout(
        speed_ms,
        Box::new(move || type_next(page, next_scheduler, title, characters, index + 1, speed_ms)),
    );
}

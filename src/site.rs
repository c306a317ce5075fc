use crate::config::SiteConfig;
use crate::logging::{log_event, LogLevel};
use crate::nav::{Menu, ResizeReset, SectionHighlighter, NAV_LINK_SELECTOR};
use crate::page::Page;
use crate::reveal::{Counters, FadeIn, ObserverOptions, VisibilityEntry};
use crate::scroll::{HeaderEffect, Parallax, SmoothScroll};
use crate::styles::inject_styles;
use crate::timing::Scheduler;
use crate::widgets::{fade_out_preloader, start_typewriter, ContactForms, Tooltips};
use serde_json::json;
use std::rc::Rc;

pub struct Bindings<E> {
    pub menu_toggle: Option<E>,
    pub nav_links: Vec<E>,
    pub anchor_links: Vec<E>,
    pub tooltip_targets: Vec<E>,
    pub contact_forms: Vec<E>,
    pub fade_targets: Vec<E>,
    pub counter_targets: Vec<E>,
}

// Features whose markup is missing stay inert.
pub struct Site<P: Page, S: Scheduler> {
    page: Rc<P>,
    scheduler: Rc<S>,
    config: SiteConfig,
    menu: Option<Rc<Menu<P>>>,
    resize_reset: Option<ResizeReset<P, S>>,
    highlighter: SectionHighlighter<P, S>,
    smooth_scroll: SmoothScroll<P>,
    header: HeaderEffect<P>,
    parallax: Parallax<P>,
    fade_in: FadeIn<P>,
    counters: Counters<P, S>,
    tooltips: Tooltips<P>,
    contact_forms: ContactForms<P, S>,
}

impl<P, S> Site<P, S>
where
    P: Page + 'static,
    S: Scheduler + 'static,
{
    pub fn init(page: Rc<P>, scheduler: Rc<S>, config: SiteConfig) -> Self {
        inject_styles(&*page);

        let options = ObserverOptions {
            threshold: config.reveal_threshold,
            bottom_margin: config.reveal_bottom_margin,
        };
        let menu = Menu::locate(Rc::clone(&page), config.log_level).map(Rc::new);
        let resize_reset = menu.as_ref().map(|menu| {
            ResizeReset::new(
                Rc::clone(menu),
                Rc::clone(&scheduler),
                config.resize_quiet_ms,
                config.mobile_breakpoint,
            )
        });

        let site = Self {
            highlighter: SectionHighlighter::new(
                Rc::clone(&page),
                Rc::clone(&scheduler),
                config.section_offset,
                config.highlight_throttle_ms,
            ),
            smooth_scroll: SmoothScroll::new(Rc::clone(&page), config.header_offset),
            header: HeaderEffect::new(
                Rc::clone(&page),
                config.header_hide_after,
                config.header_tint_after,
            ),
            parallax: Parallax::new(Rc::clone(&page), config.parallax_speed),
            fade_in: FadeIn::new(Rc::clone(&page), options),
            counters: Counters::new(
                Rc::clone(&page),
                Rc::clone(&scheduler),
                options,
                config.counter_duration_ms,
                config.counter_tick_ms,
                config.log_level,
            ),
            tooltips: Tooltips::new(Rc::clone(&page), config.tooltip_gap),
            contact_forms: ContactForms::new(
                Rc::clone(&page),
                Rc::clone(&scheduler),
                config.success_message_ms,
                config.log_level,
            ),
            menu,
            resize_reset,
            page,
            scheduler,
            config,
        };

        let typewriter = site.config.typewriter_speed_ms.is_some_and(|speed| {
            start_typewriter(&site.page, &site.scheduler, speed, site.config.log_level)
        });

        let bindings = site.bindings();
        log_event(
            site.config.log_level,
            LogLevel::Info,
            "site_initialized",
            json!({
                "menu": bindings.menu_toggle.is_some(),
                "anchor_links": bindings.anchor_links.len(),
                "fade_targets": bindings.fade_targets.len(),
                "counters": bindings.counter_targets.len(),
                "tooltips": bindings.tooltip_targets.len(),
                "contact_forms": bindings.contact_forms.len(),
                "typewriter": typewriter,
            }),
        );
        site
    }

    pub fn bindings(&self) -> Bindings<P::Element> {
        let menu_toggle = self.menu.as_ref().map(|menu| menu.toggle_element().clone());
        let nav_links = if menu_toggle.is_some() {
            self.page.query_all(NAV_LINK_SELECTOR)
        } else {
            Vec::new()
        };
        Bindings {
            menu_toggle,
            nav_links,
            anchor_links: self.smooth_scroll.links(),
            tooltip_targets: self.tooltips.targets(),
            contact_forms: self.contact_forms.forms(),
            fade_targets: self.fade_in.targets(),
            counter_targets: self.counters.targets(),
        }
    }

    pub fn fade_options(&self) -> ObserverOptions {
        self.fade_in.options()
    }

    pub fn counter_options(&self) -> ObserverOptions {
        self.counters.options()
    }

    pub fn on_menu_toggle(&self) {
        if let Some(menu) = &self.menu {
            menu.toggle();
        }
    }

    pub fn on_nav_link_click(&self) {
        if let Some(menu) = &self.menu {
            menu.close();
        }
    }

    pub fn on_anchor_click(&self, link: &P::Element) -> bool {
        self.smooth_scroll.on_link_click(link)
    }

    pub fn on_scroll(&self) {
        self.header.on_scroll();
        self.parallax.on_scroll();
        self.highlighter.on_scroll();
    }

    pub fn on_resize(&self) {
        if let Some(reset) = &self.resize_reset {
            reset.on_resize();
        }
    }

    pub fn on_load(&self) {
        fade_out_preloader(&self.page, &self.scheduler, self.config.preloader_delay_ms);
    }

    pub fn on_pointer_enter(&self, element: &P::Element) {
        self.tooltips.on_pointer_enter(element);
    }

    pub fn on_pointer_leave(&self, element: &P::Element) {
        self.tooltips.on_pointer_leave(element);
    }

    pub fn on_submit(&self, form: &P::Element) -> bool {
        self.contact_forms.on_submit(form)
    }

    pub fn on_fade_entries(&self, entries: &[VisibilityEntry<P::Element>]) -> Vec<P::Element> {
        self.fade_in.on_entries(entries)
    }

    pub fn on_counter_entries(&self, entries: &[VisibilityEntry<P::Element>]) -> Vec<P::Element> {
        self.counters.on_entries(entries)
    }
}

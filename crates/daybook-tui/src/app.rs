use std::sync::Arc;
use std::time::Instant;

use daybook_core::{AppConfig, Diary, PreferenceStore};

use crate::controller::{ControllerOptions, ViewController, ViewEvent};
use crate::input::Action;
use crate::theme::Theme;
use crate::viewport::Viewport;
use crate::widgets::HalfblockCache;

/// Application state for the terminal host
pub struct App {
    pub controller: ViewController<Viewport>,
    pub theme: Theme,
    pub show_dates: bool,
    pub should_quit: bool,
    pub halfblocks: HalfblockCache,
    row_height: u16,
}

impl App {
    pub fn new(diary: Arc<Diary>, config: &AppConfig, store: Box<dyn PreferenceStore>) -> Self {
        Self {
            controller: ViewController::new(diary, ControllerOptions::from(config), store),
            theme: Theme::default(),
            show_dates: config.ui.show_dates,
            should_quit: false,
            halfblocks: HalfblockCache::new(),
            row_height: config.ui.row_height,
        }
    }

    /// Lay out the calendar for `height` visible rows and mount it
    pub fn mount(&mut self, height: u16, now: Instant) {
        let viewport = Viewport::new(self.controller.diary(), self.row_height, height);
        self.controller.mount(viewport, now);
        // The initial centering is our own scroll
        self.dispatch_scroll(now);
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.controller.container()
    }

    /// Track the calendar height after a draw; re-centers on change
    pub fn set_calendar_height(&mut self, height: u16, now: Instant) {
        let changed = self
            .controller
            .container_mut()
            .is_some_and(|v| v.set_height(height));
        if changed {
            self.controller.handle(ViewEvent::LayoutChanged, now);
        }
    }

    /// Fire due timers and deliver any pending scroll event
    pub fn tick(&mut self, now: Instant) {
        self.dispatch_scroll(now);
        self.controller.handle(ViewEvent::Tick, now);
        self.dispatch_scroll(now);
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        if action.is_scroll() {
            self.controller.handle(ViewEvent::PointerStart, now);
            let half_page = self.viewport().map_or(1, |v| (v.height() / 2).max(1)) as i32;
            let rows = match action {
                Action::ScrollUp => -1,
                Action::ScrollDown => 1,
                Action::ScrollHalfPageUp => -half_page,
                Action::ScrollHalfPageDown => half_page,
                _ => 0,
            };
            if let Some(viewport) = self.controller.container_mut() {
                viewport.scroll_by(rows);
            }
            self.dispatch_scroll(now);
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlayback => self.controller.handle(ViewEvent::TogglePlayback, now),
            Action::ToggleText => self.controller.handle(ViewEvent::ToggleText, now),
            Action::JumpToFirst => self.controller.handle(ViewEvent::JumpTo(0), now),
            Action::JumpToLast => {
                if let Some(last) = self.controller.diary().last_index() {
                    self.controller.handle(ViewEvent::JumpTo(last), now);
                }
            }
            _ => {}
        }
        self.dispatch_scroll(now);
    }

    /// Report an offset change to the controller, like a scroll event
    fn dispatch_scroll(&mut self, now: Instant) {
        let dirty = self
            .controller
            .container_mut()
            .is_some_and(|v| v.take_dirty());
        if dirty {
            self.controller.handle(ViewEvent::Scrolled, now);
        }
    }
}

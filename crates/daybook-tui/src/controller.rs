//! View controller: single owner of the active index
//!
//! Every state change enters through [`ViewController::handle`]. Timer
//! deadlines live in the sync components and fire from `ViewEvent::Tick`;
//! image loads are handed out by [`ViewController::drain_load_requests`] and
//! come back as `ViewEvent::ImageLoaded`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use daybook_core::{AppConfig, Diary, Entry, Error, MonthKey, PreferenceStore, Preferences, Result};

use crate::preload::{ImageHandle, LoadOutcome, LoadRequest, PreloadQueue, PreloadSettings};
use crate::sync::position::offset_of_index;
use crate::sync::{
    nearest_entry, scroll_target_for, AutoplayScheduler, AutoplayState, InteractionDetector,
    ScrollKind, SectionGeometry, SectionSpan, SuppressionWindow,
};

/// Host-side scroll surface the controller reads and drives
pub trait ScrollContainer {
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Placement of a month section; `None` when the host has not laid it out
    fn section_geometry(&self, month: MonthKey) -> Option<SectionGeometry>;
    /// Assign the offset directly, without animation
    fn set_scroll_offset(&mut self, offset: f64);
}

#[derive(Debug)]
pub enum ViewEvent {
    /// Fire due timers
    Tick,
    /// Genuine user intent (wheel, drag, scroll key)
    PointerStart,
    /// The container's offset changed
    Scrolled,
    /// Section geometry or viewport size changed
    LayoutChanged,
    ImageLoaded(LoadOutcome),
    Play,
    Pause,
    TogglePlayback,
    ToggleText,
    JumpTo(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub interval: Duration,
    pub suppression: Duration,
    pub settle: Duration,
    pub preload: PreloadSettings,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            suppression: Duration::from_millis(100),
            settle: Duration::from_millis(150),
            preload: PreloadSettings::default(),
        }
    }
}

impl From<&AppConfig> for ControllerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            interval: config.playback.interval(),
            suppression: config.playback.suppression(),
            settle: config.playback.settle(),
            preload: PreloadSettings::from(&config.preload),
        }
    }
}

pub struct ViewController<C> {
    diary: Arc<Diary>,
    current_index: Option<usize>,
    show_text: bool,
    container: Option<C>,
    scheduler: AutoplayScheduler,
    detector: InteractionDetector,
    suppression: SuppressionWindow,
    suppression_len: Duration,
    /// Offset written by the last programmatic scroll
    last_assigned: Option<f64>,
    preload: PreloadQueue,
    active_image: Option<ImageHandle>,
    store: Box<dyn PreferenceStore>,
}

impl<C: ScrollContainer> ViewController<C> {
    pub fn new(diary: Arc<Diary>, options: ControllerOptions, store: Box<dyn PreferenceStore>) -> Self {
        let prefs = Preferences::load(store.as_ref());
        debug!(
            "Loaded preferences: playing={}, show_text={}",
            prefs.is_playing, prefs.show_text
        );

        Self {
            current_index: diary.last_index(),
            diary,
            show_text: prefs.show_text,
            container: None,
            scheduler: AutoplayScheduler::new(options.interval, prefs.is_playing),
            detector: InteractionDetector::new(options.settle),
            suppression: SuppressionWindow::new(),
            suppression_len: options.suppression,
            last_assigned: None,
            preload: PreloadQueue::new(options.preload),
            active_image: None,
            store,
        }
    }

    /// Attach the scroll container and center the newest entry
    pub fn mount(&mut self, container: C, now: Instant) {
        self.container = Some(container);
        let Some(index) = self.diary.last_index() else {
            self.report(Error::EmptyDataSet);
            return;
        };
        info!("Mounted view at entry {} of {}", index + 1, self.diary.len());

        if let Err(e) = self.scroll_to_index(index, now) {
            self.report(e);
        }
        self.set_index(index);
        if !self.detector.is_scrolling() {
            self.scheduler.resume(now, index);
        }
    }

    /// Detach the container; pending timers and in-flight loads are abandoned
    pub fn unmount(&mut self) -> Option<C> {
        self.scheduler.hold();
        self.detector.reset();
        self.suppression.clear();
        self.preload.teardown();
        self.last_assigned = None;
        debug!("Unmounted view");
        self.container.take()
    }

    /// The single funnel for state changes
    pub fn handle(&mut self, event: ViewEvent, now: Instant) {
        let result = match event {
            ViewEvent::Tick => {
                self.poll(now);
                Ok(())
            }
            ViewEvent::PointerStart => {
                self.detector.pointer_start();
                Ok(())
            }
            ViewEvent::Scrolled => self.on_scrolled(now),
            ViewEvent::LayoutChanged => self.recenter(now),
            ViewEvent::ImageLoaded(outcome) => {
                self.on_image_loaded(outcome, now);
                Ok(())
            }
            ViewEvent::Play => {
                self.play(now);
                Ok(())
            }
            ViewEvent::Pause => {
                self.pause();
                Ok(())
            }
            ViewEvent::TogglePlayback => {
                self.toggle_playback(now);
                Ok(())
            }
            ViewEvent::ToggleText => {
                self.toggle_text_visibility();
                Ok(())
            }
            ViewEvent::JumpTo(index) => self.jump_to(index, now),
        };

        if let Err(e) = result {
            self.report(e);
        }
    }

    /// Fire the settle timer and the autoplay timer if due
    pub fn poll(&mut self, now: Instant) {
        if self.detector.poll(now) {
            if let Err(e) = self.on_settled(now) {
                self.report(e);
            }
        }
        if self.scheduler.poll(now) {
            if let Err(e) = self.autoplay_step(now) {
                self.report(e);
            }
        }
    }

    /// Image loads that may start now
    pub fn drain_load_requests(&mut self, now: Instant) -> Vec<LoadRequest> {
        self.preload.pump(now, &self.diary)
    }

    pub fn play(&mut self, now: Instant) {
        self.scheduler.play(now, self.current_index.unwrap_or(0));
        if self.detector.is_scrolling() || self.container.is_none() {
            // Resumes on settle or mount
            self.scheduler.hold();
        }
        info!("Playback started");
        Preferences::save_is_playing(self.store.as_mut(), true);
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
        info!("Playback paused");
        Preferences::save_is_playing(self.store.as_mut(), false);
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        if self.scheduler.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    pub fn toggle_text_visibility(&mut self) {
        self.show_text = !self.show_text;
        Preferences::save_show_text(self.store.as_mut(), self.show_text);
    }

    pub fn diary(&self) -> &Diary {
        &self.diary
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn active_entry(&self) -> Option<&Entry> {
        self.current_index.and_then(|i| self.diary.get(i))
    }

    /// Decoded image of the active entry, when loaded
    pub fn active_image(&self) -> Option<&ImageHandle> {
        self.active_image.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn autoplay_state(&self) -> AutoplayState {
        self.scheduler.state()
    }

    pub fn is_scrolling(&self) -> bool {
        self.detector.is_scrolling()
    }

    pub fn show_text(&self) -> bool {
        self.show_text
    }

    pub fn preload(&self) -> &PreloadQueue {
        &self.preload
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    pub fn container(&self) -> Option<&C> {
        self.container.as_ref()
    }

    pub fn container_mut(&mut self) -> Option<&mut C> {
        self.container.as_mut()
    }

    fn autoplay_step(&mut self, now: Instant) -> Result<()> {
        let current = self.current_index.ok_or(Error::EmptyDataSet)?;
        if self.container.is_none() {
            return Err(Error::MissingContainer);
        }
        let Some(next) = self.scheduler.advance(current) else {
            return Ok(());
        };

        self.scroll_to_index(next, now)?;
        self.set_index(next);
        Ok(())
    }

    fn on_scrolled(&mut self, now: Instant) -> Result<()> {
        if self.container.is_none() {
            return Err(Error::MissingContainer);
        }

        match self.detector.on_scroll(now, &self.suppression) {
            ScrollKind::Manual => {
                self.scheduler.hold();
                self.refresh_from_offset()
            }
            ScrollKind::Programmatic => {
                // Our own write already chose the index
                let offset = self.container.as_ref().map(|c| c.scroll_offset());
                if offset == self.last_assigned {
                    Ok(())
                } else {
                    self.refresh_from_offset()
                }
            }
            ScrollKind::Passive => self.refresh_from_offset(),
        }
    }

    fn on_settled(&mut self, now: Instant) -> Result<()> {
        self.refresh_from_offset()?;
        if let Some(index) = self.current_index {
            self.scheduler.resume(now, index);
        }
        Ok(())
    }

    fn on_image_loaded(&mut self, outcome: LoadOutcome, now: Instant) {
        let index = outcome.index;
        if let Some(handle) = self.preload.complete(outcome, now) {
            if Some(index) == self.current_index {
                self.active_image = Some(handle);
            }
        }
    }

    fn recenter(&mut self, now: Instant) -> Result<()> {
        let index = self.current_index.ok_or(Error::EmptyDataSet)?;
        self.scroll_to_index(index, now)
    }

    fn jump_to(&mut self, index: usize, now: Instant) -> Result<()> {
        if index >= self.diary.len() {
            return Err(Error::Other(format!("No entry at index {}", index)));
        }
        self.scroll_to_index(index, now)?;
        self.set_index(index);
        if !self.detector.is_scrolling() {
            self.scheduler.resume(now, index);
        }
        Ok(())
    }

    /// Programmatic scroll centering `index`
    fn scroll_to_index(&mut self, index: usize, now: Instant) -> Result<()> {
        let container = self.container.as_mut().ok_or(Error::MissingContainer)?;
        let spans = section_spans(&self.diary, container);
        let anchor = offset_of_index(index, &spans)
            .ok_or_else(|| Error::Other(format!("No layout for entry {}", index)))?;
        let target = scroll_target_for(anchor, container.viewport_height());

        self.suppression.arm(now, self.suppression_len);
        container.set_scroll_offset(target);
        self.last_assigned = Some(container.scroll_offset());
        Ok(())
    }

    fn refresh_from_offset(&mut self) -> Result<()> {
        let container = self.container.as_ref().ok_or(Error::MissingContainer)?;
        let spans = section_spans(&self.diary, container);
        let index = nearest_entry(container.scroll_offset(), container.viewport_height(), &spans)
            .ok_or(Error::EmptyDataSet)?;
        if self.current_index != Some(index) {
            self.set_index(index);
        }
        Ok(())
    }

    fn set_index(&mut self, index: usize) {
        self.current_index = Some(index);
        self.active_image = self
            .diary
            .get(index)
            .and_then(|entry| self.preload.get(&entry.key()))
            .cloned();
        self.preload.request(index);
    }

    fn report(&self, error: Error) {
        match error {
            Error::MissingContainer | Error::EmptyDataSet => debug!("Skipped view update: {}", error),
            other => warn!("View update failed: {}", other),
        }
    }
}

fn section_spans<C: ScrollContainer>(diary: &Diary, container: &C) -> Vec<SectionSpan> {
    diary
        .sections()
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            container.section_geometry(s.month).map(|geometry| SectionSpan {
                geometry,
                first_index: s.start,
                count: s.len,
            })
        })
        .collect()
}

//! Preload pass scheduling
//!
//! The queue is a synchronous state machine driven by the event loop:
//! `request` records the active index, `pump` hands out loads that may start
//! now, and `complete` applies finished loads. Actual I/O happens in
//! `loader::spawn_load`.
//!
//! Only one pass exists at a time. An index change during a pass stops the
//! pass from issuing further loads; once its in-flight loads have all
//! completed, the next pass is built from the most recent index.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use daybook_core::Diary;

use super::cache::PreloadCache;
use super::loader::{ImageHandle, LoadOutcome, LoadRequest};
use super::plan::build_plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadSettings {
    pub cache_capacity: usize,
    pub fan_out: usize,
    pub surrounding: usize,
    pub sequential_pause: Duration,
    /// Load the rest of the diary after the neighbours
    pub background: bool,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            cache_capacity: 10,
            fan_out: 3,
            surrounding: 5,
            sequential_pause: Duration::from_millis(100),
            background: true,
        }
    }
}

impl From<&daybook_core::config::PreloadConfig> for PreloadSettings {
    /// With preloading disabled only the active entry is loaded
    fn from(config: &daybook_core::config::PreloadConfig) -> Self {
        Self {
            cache_capacity: config.cache_capacity.max(1),
            fan_out: config.fan_out.max(1),
            surrounding: if config.enabled { config.surrounding } else { 0 },
            sequential_pause: config.sequential_pause(),
            background: config.enabled,
        }
    }
}

#[derive(Debug)]
struct Pass {
    origin: usize,
    urgent: VecDeque<usize>,
    background: VecDeque<usize>,
    /// Earliest time the next background load may start
    background_ready_at: Option<Instant>,
}

pub struct PreloadQueue {
    settings: PreloadSettings,
    cache: PreloadCache<ImageHandle>,
    generation: u64,
    pass: Option<Pass>,
    in_flight: usize,
    /// Latest index requested while waiting for a rebuild
    pending: Option<usize>,
}

impl PreloadQueue {
    pub fn new(settings: PreloadSettings) -> Self {
        Self {
            cache: PreloadCache::new(settings.cache_capacity),
            settings,
            generation: 0,
            pass: None,
            in_flight: 0,
            pending: None,
        }
    }

    pub fn settings(&self) -> &PreloadSettings {
        &self.settings
    }

    pub fn cache(&self) -> &PreloadCache<ImageHandle> {
        &self.cache
    }

    pub fn get(&self, key: &str) -> Option<&ImageHandle> {
        self.cache.get(key)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Loads issued and not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// No pass running and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.pass.is_none() && self.pending.is_none() && self.in_flight == 0
    }

    /// Note a new active index; the rebuild happens on a later `pump`
    pub fn request(&mut self, index: usize) {
        if self.pass.as_ref().is_some_and(|p| p.origin == index) && self.pending.is_none() {
            return;
        }
        if self.pending.replace(index).is_some() {
            debug!("Coalescing preload rebuild to index {}", index);
        }
    }

    /// Loads that may start at `now`
    pub fn pump(&mut self, now: Instant, diary: &Diary) -> Vec<LoadRequest> {
        let mut requests = Vec::new();

        if let Some(index) = self.pending {
            if self.in_flight > 0 {
                // Let the current batch drain before rebuilding
                return requests;
            }
            self.pending = None;
            self.start_pass(index, diary);
        }

        let Some(pass) = self.pass.as_mut() else {
            return requests;
        };

        while self.in_flight < self.settings.fan_out {
            let Some(index) = pass.urgent.pop_front() else {
                break;
            };
            if let Some(request) = Self::issue(index, diary, &self.cache, self.generation) {
                self.in_flight += 1;
                requests.push(request);
            }
        }

        if pass.urgent.is_empty() && self.in_flight == 0 {
            let ready = pass.background_ready_at.map_or(true, |at| at <= now);
            if ready {
                while let Some(index) = pass.background.pop_front() {
                    if let Some(request) = Self::issue(index, diary, &self.cache, self.generation) {
                        self.in_flight += 1;
                        requests.push(request);
                        break;
                    }
                }
            }

            if self.in_flight == 0 && pass.background.is_empty() {
                debug!("Preload pass from index {} finished", pass.origin);
                self.pass = None;
            }
        }

        requests
    }

    /// Apply a finished load
    ///
    /// Returns the loaded handle when it was accepted into the cache.
    pub fn complete(&mut self, outcome: LoadOutcome, now: Instant) -> Option<ImageHandle> {
        if outcome.generation != self.generation {
            debug!(
                "Dropping stale image load for {} (generation {} != {})",
                outcome.key, outcome.generation, self.generation
            );
            return None;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        if let Some(pass) = self.pass.as_mut() {
            if pass.urgent.is_empty() {
                pass.background_ready_at = Some(now + self.settings.sequential_pause);
            }
        }

        match outcome.result {
            Ok(handle) => {
                if let Some(evicted) = self.cache.insert(outcome.key.clone(), handle.clone()) {
                    debug!("Evicted {} from image cache", evicted);
                }
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to preload image for {}: {}", outcome.key, e);
                None
            }
        }
    }

    /// Abandon everything in flight; later completions become no-ops
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.pass = None;
        self.pending = None;
        self.in_flight = 0;
    }

    fn start_pass(&mut self, index: usize, diary: &Diary) {
        let cache = &self.cache;
        let mut plan = build_plan(diary.entries(), index, self.settings.surrounding, |e| {
            cache.contains(&e.key())
        });
        if !self.settings.background {
            plan.background.clear();
        }
        debug!(
            "Preload pass from index {}: {} urgent, {} background",
            index,
            plan.urgent.len(),
            plan.background.len()
        );
        self.pass = Some(Pass {
            origin: index,
            urgent: plan.urgent.into(),
            background: plan.background.into(),
            background_ready_at: None,
        });
    }

    fn issue(
        index: usize,
        diary: &Diary,
        cache: &PreloadCache<ImageHandle>,
        generation: u64,
    ) -> Option<LoadRequest> {
        let entry = diary.get(index)?;
        let reference = entry.image.clone()?;
        let key = entry.key();
        if cache.contains(&key) {
            return None;
        }
        Some(LoadRequest {
            index,
            key,
            reference,
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration as Days, NaiveDate};
    use daybook_core::Entry;
    use image::DynamicImage;

    use crate::preload::loader::{spawn_load, ImageLoader};

    fn diary(n: usize) -> Diary {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Diary::new(
            (0..n)
                .map(|i| {
                    let date = start + Days::days(i as i64);
                    Entry::new(date).with_image(format!("{}.webp", date))
                })
                .collect(),
        )
        .unwrap()
    }

    fn settings() -> PreloadSettings {
        PreloadSettings {
            cache_capacity: 10,
            fan_out: 3,
            surrounding: 2,
            sequential_pause: Duration::from_millis(100),
            background: true,
        }
    }

    fn ok(request: &LoadRequest) -> LoadOutcome {
        LoadOutcome {
            index: request.index,
            key: request.key.clone(),
            generation: request.generation,
            result: Ok(Arc::new(DynamicImage::new_rgb8(1, 1))),
        }
    }

    fn failed(request: &LoadRequest) -> LoadOutcome {
        LoadOutcome {
            index: request.index,
            key: request.key.clone(),
            generation: request.generation,
            result: Err("boom".to_string()),
        }
    }

    #[test]
    fn test_urgent_batch_respects_fan_out() {
        let diary = diary(10);
        let mut queue = PreloadQueue::new(settings());
        let t0 = Instant::now();

        queue.request(5);
        let first = queue.pump(t0, &diary);
        assert_eq!(first.iter().map(|r| r.index).collect::<Vec<_>>(), vec![5, 4, 6]);
        assert_eq!(queue.in_flight(), 3);
        assert!(queue.pump(t0, &diary).is_empty());

        queue.complete(ok(&first[0]), t0);
        let next = queue.pump(t0, &diary);
        assert_eq!(next.iter().map(|r| r.index).collect::<Vec<_>>(), vec![3]);
        assert!(queue.in_flight() <= 3);
    }

    #[test]
    fn test_background_is_sequential_with_pause() {
        let diary = diary(6);
        let mut queue = PreloadQueue::new(PreloadSettings {
            surrounding: 0,
            ..settings()
        });
        let t0 = Instant::now();

        queue.request(5);
        let urgent = queue.pump(t0, &diary);
        assert_eq!(urgent.len(), 1);
        queue.complete(ok(&urgent[0]), t0);

        // Pause applies after every completed background-phase load
        assert!(queue.pump(t0, &diary).is_empty());
        let t1 = t0 + Duration::from_millis(100);
        let bg = queue.pump(t1, &diary);
        assert_eq!(bg.iter().map(|r| r.index).collect::<Vec<_>>(), vec![4]);
        assert!(queue.pump(t1 + Duration::from_secs(1), &diary).is_empty());

        queue.complete(ok(&bg[0]), t1);
        assert!(queue.pump(t1 + Duration::from_millis(50), &diary).is_empty());
        let bg = queue.pump(t1 + Duration::from_millis(100), &diary);
        assert_eq!(bg[0].index, 3);
    }

    #[test]
    fn test_failure_is_skipped_not_retried() {
        let diary = diary(3);
        let mut queue = PreloadQueue::new(PreloadSettings {
            surrounding: 0,
            sequential_pause: Duration::ZERO,
            ..settings()
        });
        let t0 = Instant::now();

        queue.request(2);
        let first = queue.pump(t0, &diary);
        assert!(queue.complete(failed(&first[0]), t0).is_none());

        let mut seen = Vec::new();
        loop {
            let batch = queue.pump(t0, &diary);
            if batch.is_empty() {
                break;
            }
            for request in &batch {
                seen.push(request.index);
                queue.complete(ok(request), t0);
            }
        }
        assert_eq!(seen, vec![1, 0]);
        assert!(queue.is_idle());
        assert!(!queue.cache().contains(&first[0].key));
    }

    #[test]
    fn test_rebuild_coalesces_after_in_flight_drains() {
        let diary = diary(10);
        let mut queue = PreloadQueue::new(settings());
        let t0 = Instant::now();

        queue.request(5);
        let first = queue.pump(t0, &diary);
        assert_eq!(first.len(), 3);

        // Two changes mid-pass: only the latest one is planned
        queue.request(8);
        queue.request(9);
        queue.complete(ok(&first[0]), t0);
        assert!(queue.pump(t0, &diary).is_empty());
        queue.complete(ok(&first[1]), t0);
        queue.complete(ok(&first[2]), t0);

        let rebuilt = queue.pump(t0, &diary);
        assert_eq!(rebuilt.iter().map(|r| r.index).collect::<Vec<_>>(), vec![9, 8, 7]);
    }

    #[test]
    fn test_teardown_drops_late_completions() {
        let diary = diary(4);
        let mut queue = PreloadQueue::new(settings());
        let t0 = Instant::now();

        queue.request(3);
        let issued = queue.pump(t0, &diary);
        queue.teardown();

        assert!(queue.complete(ok(&issued[0]), t0).is_none());
        assert!(queue.cache().is_empty());
        assert_eq!(queue.in_flight(), 0);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_cached_entries_are_not_reloaded() {
        let diary = diary(3);
        let mut queue = PreloadQueue::new(PreloadSettings {
            sequential_pause: Duration::ZERO,
            ..settings()
        });
        let t0 = Instant::now();

        queue.request(1);
        for request in queue.pump(t0, &diary) {
            queue.complete(ok(&request), t0);
        }
        assert_eq!(queue.cache().len(), 3);

        queue.request(0);
        assert!(queue.pump(t0, &diary).is_empty());
        assert!(queue.is_idle());
    }

    #[test]
    fn test_disabled_preload_loads_only_active() {
        let diary = diary(5);
        let config = daybook_core::config::PreloadConfig {
            enabled: false,
            ..Default::default()
        };
        let mut queue = PreloadQueue::new(PreloadSettings::from(&config));
        let t0 = Instant::now();

        queue.request(2);
        let issued = queue.pump(t0, &diary);
        assert_eq!(issued.iter().map(|r| r.index).collect::<Vec<_>>(), vec![2]);
        queue.complete(ok(&issued[0]), t0);
        assert!(queue.pump(t0 + Duration::from_secs(1), &diary).is_empty());
        assert!(queue.is_idle());
    }

    struct InstrumentedLoader {
        current: std::sync::atomic::AtomicUsize,
        peak: std::sync::atomic::AtomicUsize,
        total: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ImageLoader for InstrumentedLoader {
        async fn load(&self, _reference: &str) -> daybook_core::Result<DynamicImage> {
            use std::sync::atomic::Ordering;
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.total.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(DynamicImage::new_rgb8(1, 1))
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_never_exceed_fan_out() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let diary = diary(10);
        let loader = Arc::new(InstrumentedLoader {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        });
        let dyn_loader: Arc<dyn ImageLoader> = loader.clone();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut queue = PreloadQueue::new(PreloadSettings {
            sequential_pause: Duration::ZERO,
            ..settings()
        });

        queue.request(5);
        loop {
            for request in queue.pump(Instant::now(), &diary) {
                spawn_load(dyn_loader.clone(), request, tx.clone());
            }
            if queue.is_idle() {
                break;
            }
            let outcome = rx.recv().await.unwrap();
            queue.complete(outcome, Instant::now());
        }

        assert_eq!(loader.peak.load(Ordering::SeqCst), 3);
        assert_eq!(loader.total.load(Ordering::SeqCst), 10);
        assert_eq!(queue.cache().len(), 10);
    }
}

//! Image preloading around the active entry
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `cache` - FIFO image cache
//! - `plan` - Priority order for one pass
//!
//! ## L3 Molecular Layer
//! - `loader` - Async image loading and completion delivery
//! - `queue` - Pass state machine (fan-out, sequential background, coalescing)

// L4 Atomic Layer
pub mod cache;
pub mod plan;

// L3 Molecular Layer
pub mod loader;
pub mod queue;

pub use cache::PreloadCache;
pub use loader::{decode_image_bytes, spawn_load, DiskImageLoader, ImageHandle, ImageLoader, LoadOutcome, LoadRequest};
pub use plan::{build_plan, PreloadPlan};
pub use queue::{PreloadQueue, PreloadSettings};

//! Scroll-position to entry synchronization
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `position` - Pure entry/offset math
//! - `suppression` - Time-stamped "this scroll is mine" window
//!
//! ## L3 Molecular Layer
//! - `autoplay` - Timer state machine that steps the active index
//! - `interaction` - Manual vs programmatic scroll classification and settle debounce
//!
//! The controller (`crate::controller`) composes these into the single
//! event funnel.

// L4 Atomic Layer
pub mod position;
pub mod suppression;

// L3 Molecular Layer
pub mod autoplay;
pub mod interaction;

pub use autoplay::{AutoplayScheduler, AutoplayState};
pub use interaction::{InteractionDetector, ScrollKind};
pub use position::{entry_offset, nearest_entry, scroll_target_for, SectionGeometry, SectionSpan};
pub use suppression::SuppressionWindow;

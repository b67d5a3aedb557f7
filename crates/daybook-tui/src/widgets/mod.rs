mod calendar;
mod entry_view;
mod status_bar;

pub use calendar::{CalendarWidget, CALENDAR_WIDTH};
pub use entry_view::{render_halfblocks, EntryViewWidget, HalfblockCache};
pub use status_bar::StatusBarWidget;

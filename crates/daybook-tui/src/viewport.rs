//! Terminal scroll surface for the calendar column
//!
//! Month sections are stacked top to bottom in row units: a title row, a
//! weekday header and one block of `row_height` rows per calendar week.

use std::collections::HashMap;

use daybook_core::{Diary, MonthKey};

use crate::controller::ScrollContainer;
use crate::sync::SectionGeometry;

/// Rows above the week grid (title, weekday header)
pub const SECTION_HEADER_ROWS: u16 = 2;
/// Blank rows between two month sections
pub const SECTION_GAP_ROWS: u16 = 1;

/// Row placement of one month section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRows {
    pub month: MonthKey,
    pub top: u16,
    pub height: u16,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    sections: Vec<SectionRows>,
    by_month: HashMap<MonthKey, SectionRows>,
    row_height: u16,
    content_height: u16,
    height: u16,
    offset: f64,
    /// Set by every offset change, cleared by `take_dirty`
    dirty: bool,
}

impl Viewport {
    pub fn new(diary: &Diary, row_height: u16, height: u16) -> Self {
        let row_height = row_height.max(1);
        let mut sections = Vec::with_capacity(diary.sections().len());
        let mut top = 0u16;

        for section in diary.sections() {
            // Rows saturate at u16::MAX for absurd row heights
            let weeks = section.month.week_rows() as u16;
            let height = SECTION_HEADER_ROWS.saturating_add(weeks.saturating_mul(row_height));
            sections.push(SectionRows {
                month: section.month,
                top,
                height,
            });
            top = top.saturating_add(height).saturating_add(SECTION_GAP_ROWS);
        }

        let content_height = sections
            .last()
            .map_or(0, |s: &SectionRows| s.top.saturating_add(s.height));
        let by_month = sections.iter().map(|s| (s.month, *s)).collect();

        Self {
            sections,
            by_month,
            row_height,
            content_height,
            height,
            offset: 0.0,
            dirty: false,
        }
    }

    pub fn sections(&self) -> &[SectionRows] {
        &self.sections
    }

    pub fn row_height(&self) -> u16 {
        self.row_height
    }

    pub fn content_height(&self) -> u16 {
        self.content_height
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Update the visible height; returns true when it changed
    pub fn set_height(&mut self, height: u16) -> bool {
        if self.height == height {
            return false;
        }
        self.height = height;
        self.set_offset(self.offset);
        true
    }

    /// First visible content row
    pub fn top_row(&self) -> u16 {
        self.offset.round() as u16
    }

    /// Scroll by whole rows (positive moves towards newer months)
    pub fn scroll_by(&mut self, rows: i32) {
        self.set_offset(self.offset + rows as f64);
    }

    /// Whether the offset changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Furthest offset; the last row may scroll up to the viewport center
    fn max_offset(&self) -> f64 {
        (self.content_height as f64 - self.height as f64 / 2.0).max(0.0)
    }

    fn set_offset(&mut self, offset: f64) {
        let clamped = offset.clamp(0.0, self.max_offset());
        if clamped != self.offset {
            self.offset = clamped;
            self.dirty = true;
        }
    }
}

impl ScrollContainer for Viewport {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.height as f64
    }

    fn section_geometry(&self, month: MonthKey) -> Option<SectionGeometry> {
        self.by_month.get(&month).map(|s| SectionGeometry {
            top: s.top as f64,
            height: s.height as f64,
        })
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.set_offset(offset);
    }
}

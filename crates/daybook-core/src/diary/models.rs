use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// One dated diary record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    /// Image reference: a path relative to the images directory, an absolute
    /// path, or an http(s) URL
    pub image: Option<String>,
    pub text: Option<String>,
}

impl Entry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            image: None,
            text: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Stable key for caches and logs (`YYYY-MM-DD`)
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }
}

/// Calendar month used to group entries into sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|n| (n - first).num_days() as u32).unwrap_or(0)
    }

    /// Weekday of the 1st, 0 = Sunday
    pub fn first_weekday(&self) -> u32 {
        self.first_day()
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// Number of calendar rows (weeks) needed to draw this month
    pub fn week_rows(&self) -> u32 {
        (self.first_weekday() + self.days_in_month()).div_ceil(7)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name(), self.year)
    }
}

/// Contiguous run of entries sharing a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub month: MonthKey,
    /// Global index of the first entry in this section
    pub start: usize,
    pub len: usize,
}

impl Section {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The full ordered, immutable entry sequence
#[derive(Debug, Clone, Default)]
pub struct Diary {
    entries: Vec<Entry>,
    sections: Vec<Section>,
}

impl Diary {
    /// Build a diary from entries in any order. Entries are sorted by date;
    /// two entries on the same date are rejected.
    pub fn new(mut entries: Vec<Entry>) -> Result<Self> {
        entries.sort_by_key(|e| e.date);
        if let Some(pair) = entries.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(Error::DuplicateDate(pair[0].date));
        }

        let mut sections: Vec<Section> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            let month = entry.month();
            match sections.last_mut() {
                Some(section) if section.month == month => section.len += 1,
                _ => sections.push(Section {
                    month,
                    start: idx,
                    len: 1,
                }),
            }
        }

        Ok(Self { entries, sections })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// Section containing a global index, with the index inside that section
    pub fn locate(&self, index: usize) -> Option<(&Section, usize)> {
        if index >= self.entries.len() {
            return None;
        }
        let pos = self.sections.partition_point(|s| s.start + s.len <= index);
        self.sections.get(pos).map(|s| (s, index - s.start))
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.entries.binary_search_by_key(&date, |e| e.date).ok()
    }

    pub fn section_for(&self, month: MonthKey) -> Option<&Section> {
        self.sections.iter().find(|s| s.month == month)
    }
}

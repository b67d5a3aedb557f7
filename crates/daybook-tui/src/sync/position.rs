//! L4 Atomic Layer: Pure offset math between entries and scroll positions
//!
//! Entries are spread evenly across their month section; an entry's anchor is
//! the middle of its slice of the section height.

/// Vertical placement of one month section inside the scroll surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    pub top: f64,
    pub height: f64,
}

/// A section's geometry together with the global entry range it covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSpan {
    pub geometry: SectionGeometry,
    /// Global index of the first entry in the section
    pub first_index: usize,
    pub count: usize,
}

/// Anchor offset of the `index`-th of `count` entries in a section
///
/// Returns `None` for an empty section.
#[inline]
pub fn entry_offset(section_top: f64, section_height: f64, index: usize, count: usize) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(section_top + (section_height / count as f64) * (index as f64 + 0.5))
}

/// Scroll offset that centers `entry_offset` in the viewport
///
/// Never negative. The scroll container clamps the upper end.
#[inline]
pub fn scroll_target_for(entry_offset: f64, viewport_height: f64) -> f64 {
    (entry_offset - viewport_height / 2.0).max(0.0)
}

/// Global index of the entry whose anchor is closest to the viewport center
///
/// Ties go to the earliest entry. Returns `None` when no section has entries.
pub fn nearest_entry(scroll_offset: f64, viewport_height: f64, spans: &[SectionSpan]) -> Option<usize> {
    let center = scroll_offset + viewport_height / 2.0;
    let mut best: Option<(usize, f64)> = None;

    for span in spans {
        for i in 0..span.count {
            let Some(offset) = entry_offset(span.geometry.top, span.geometry.height, i, span.count)
            else {
                continue;
            };
            let distance = (offset - center).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((span.first_index + i, distance));
            }
        }
    }

    best.map(|(index, _)| index)
}

/// Anchor offset of a global entry index, if a span covers it
pub fn offset_of_index(index: usize, spans: &[SectionSpan]) -> Option<f64> {
    spans
        .iter()
        .find(|s| index >= s.first_index && index < s.first_index + s.count)
        .and_then(|s| entry_offset(s.geometry.top, s.geometry.height, index - s.first_index, s.count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans() -> Vec<SectionSpan> {
        vec![
            SectionSpan {
                geometry: SectionGeometry { top: 0.0, height: 40.0 },
                first_index: 0,
                count: 4,
            },
            SectionSpan {
                geometry: SectionGeometry { top: 40.0, height: 0.0 },
                first_index: 4,
                count: 0,
            },
            SectionSpan {
                geometry: SectionGeometry { top: 50.0, height: 30.0 },
                first_index: 4,
                count: 3,
            },
        ]
    }

    #[test]
    fn test_entry_offset_formula() {
        assert_eq!(entry_offset(100.0, 40.0, 0, 4), Some(105.0));
        assert_eq!(entry_offset(100.0, 40.0, 3, 4), Some(135.0));
        assert_eq!(entry_offset(100.0, 40.0, 0, 0), None);
    }

    #[test]
    fn test_entry_offset_strictly_increasing() {
        for count in 1..20 {
            let mut prev = f64::NEG_INFINITY;
            for i in 0..count {
                let offset = entry_offset(12.5, 97.0, i, count).unwrap();
                assert!(offset > prev, "count={} i={}", count, i);
                prev = offset;
            }
        }
    }

    #[test]
    fn test_scroll_target_never_negative() {
        for entry in [0.0, 1.0, 9.99, 10.0, 500.0] {
            for viewport in [0.0, 1.0, 20.0, 1000.0] {
                assert!(scroll_target_for(entry, viewport) >= 0.0);
            }
        }
        assert_eq!(scroll_target_for(105.0, 20.0), 95.0);
    }

    #[test]
    fn test_nearest_entry_roundtrip() {
        let spans = spans();
        let viewport = 10.0;
        for span in &spans {
            for i in 0..span.count {
                let offset = entry_offset(span.geometry.top, span.geometry.height, i, span.count).unwrap();
                let scroll = offset - viewport / 2.0;
                assert_eq!(
                    nearest_entry(scroll, viewport, &spans),
                    Some(span.first_index + i)
                );
            }
        }
    }

    #[test]
    fn test_nearest_entry_tie_prefers_first() {
        // Anchors at 5 and 15; center exactly at 10
        let spans = [SectionSpan {
            geometry: SectionGeometry { top: 0.0, height: 20.0 },
            first_index: 0,
            count: 2,
        }];
        assert_eq!(nearest_entry(5.0, 10.0, &spans), Some(0));
    }

    #[test]
    fn test_nearest_entry_empty() {
        assert_eq!(nearest_entry(0.0, 10.0, &[]), None);
        let empty = [SectionSpan {
            geometry: SectionGeometry { top: 0.0, height: 10.0 },
            first_index: 0,
            count: 0,
        }];
        assert_eq!(nearest_entry(0.0, 10.0, &empty), None);
    }

    #[test]
    fn test_offset_of_index() {
        let spans = spans();
        assert_eq!(offset_of_index(0, &spans), Some(5.0));
        assert_eq!(offset_of_index(5, &spans), Some(65.0));
        assert_eq!(offset_of_index(7, &spans), None);
    }
}

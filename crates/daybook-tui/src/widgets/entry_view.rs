use std::sync::Arc;

use image::{GenericImageView, RgbaImage};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::preload::ImageHandle;

pub struct EntryViewWidget;

impl EntryViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let Some(entry) = app.controller.active_entry() else {
            Self::render_placeholder(frame, area, "No diary entries", theme.grey0);
            return;
        };

        let show_text = app.controller.show_text() && (entry.text.is_some() || app.show_dates);
        let chunks = if show_text {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(70), Constraint::Min(3)])
                .split(area)
        } else {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1)])
                .split(area)
        };

        let fitted = app
            .controller
            .active_image()
            .and_then(|img| app.halfblocks.fit(img, chunks[0]));
        match fitted {
            Some(rgba) => render_halfblocks(frame, chunks[0], rgba),
            None if entry.image.is_some() => {
                Self::render_placeholder(frame, chunks[0], "Loading…", theme.grey2)
            }
            None => Self::render_placeholder(frame, chunks[0], "No image", theme.grey0),
        }

        if show_text {
            let mut lines = Vec::new();
            if app.show_dates {
                lines.push(Line::from(Span::styled(
                    entry.date.format("%A, %B %-d, %Y").to_string(),
                    Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::default());
            }
            if let Some(text) = &entry.text {
                lines.extend(
                    text.lines()
                        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.fg0)))),
                );
            }

            let paragraph = Paragraph::new(lines)
                .block(Block::default().padding(Padding::horizontal(2)))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, chunks[1]);
        }
    }

    fn render_placeholder(frame: &mut Frame, area: Rect, message: &str, color: Color) {
        if area.height == 0 {
            return;
        }
        let width = (message.width() as u16).min(area.width);
        let line_area = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height / 2,
            width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message.to_string(), Style::default().fg(color))),
            line_area,
        );
    }
}

/// Last image resampled for the entry pane
struct Fitted {
    image: ImageHandle,
    area: Rect,
    rgba: RgbaImage,
}

/// Keeps the resampled pixels between draws
///
/// The pane redraws every tick; resampling only reruns when the image or the
/// target area changes.
#[derive(Default)]
pub struct HalfblockCache {
    fitted: Option<Fitted>,
    resamples: usize,
}

impl HalfblockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `img` scaled to fit `area` at two pixels per cell
    pub fn fit(&mut self, img: &ImageHandle, area: Rect) -> Option<&RgbaImage> {
        let fresh = self
            .fitted
            .as_ref()
            .is_some_and(|f| Arc::ptr_eq(&f.image, img) && f.area == area);
        if !fresh {
            let (width, height) = fit_dimensions(img.dimensions(), area)?;
            self.fitted = Some(Fitted {
                image: img.clone(),
                area,
                rgba: img.thumbnail_exact(width, height).to_rgba8(),
            });
            self.resamples += 1;
        }
        self.fitted.as_ref().map(|f| &f.rgba)
    }
}

/// Aspect-ratio preserving size of an image fitted into `area`
fn fit_dimensions((img_width, img_height): (u32, u32), area: Rect) -> Option<(u32, u32)> {
    if area.width == 0 || area.height == 0 || img_width == 0 || img_height == 0 {
        return None;
    }
    let target_width = area.width as u32;
    let target_height = (area.height as u32) * 2;

    let scale_w = target_width as f32 / img_width as f32;
    let scale_h = target_height as f32 / img_height as f32;
    let scale = scale_w.min(scale_h);

    Some((
        ((img_width as f32 * scale) as u32).clamp(1, target_width),
        ((img_height as f32 * scale) as u32).clamp(1, target_height),
    ))
}

/// Draw already fitted pixels with half-block characters, two pixels per cell
pub fn render_halfblocks(frame: &mut Frame, area: Rect, rgba: &RgbaImage) {
    let (new_width, new_height) = rgba.dimensions();
    if area.width == 0 || area.height == 0 || new_width == 0 || new_height == 0 {
        return;
    }

    // Center the image
    let x_offset = (area.width as u32).saturating_sub(new_width) / 2;
    let y_offset = (area.height as u32).saturating_sub(new_height.div_ceil(2)) / 2;

    for row in 0..new_height.div_ceil(2) {
        let y = row * 2;
        let mut spans: Vec<Span> = Vec::with_capacity(new_width as usize + 1);
        if x_offset > 0 {
            spans.push(Span::raw(" ".repeat(x_offset as usize)));
        }

        for x in 0..new_width {
            let top = rgba.get_pixel(x, y);
            let bottom = if y + 1 < new_height {
                rgba.get_pixel(x, y + 1)
            } else {
                top
            };
            spans.push(Span::styled(
                "▀",
                Style::default()
                    .fg(Color::Rgb(top[0], top[1], top[2]))
                    .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
            ));
        }

        let line_area = Rect {
            x: area.x,
            y: area.y + (y_offset + row) as u16,
            width: area.width,
            height: 1,
        };
        if line_area.y < area.y + area.height {
            frame.render_widget(Paragraph::new(Line::from(spans)), line_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use ratatui::{backend::TestBackend, Terminal};

    fn red_square() -> ImageHandle {
        Arc::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]))))
    }

    #[test]
    fn test_halfblocks_fill_centered() {
        let backend = TestBackend::new(10, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let img = red_square();
        let mut cache = HalfblockCache::new();

        terminal
            .draw(|frame| {
                let area = frame.area();
                let rgba = cache.fit(&img, area).unwrap();
                render_halfblocks(frame, area, rgba);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        // 8x8 scaled into 10x8 pixels: 8 columns wide, one column margin each side
        assert_eq!(buffer[(0, 0)].symbol(), " ");
        assert_eq!(buffer[(1, 0)].symbol(), "▀");
        assert_eq!(buffer[(8, 3)].symbol(), "▀");
    }

    #[test]
    fn test_resample_reused_until_image_or_area_changes() {
        let img = red_square();
        let area = Rect::new(0, 0, 10, 4);
        let mut cache = HalfblockCache::new();

        assert_eq!(cache.fit(&img, area).unwrap().dimensions(), (8, 8));
        cache.fit(&img, area);
        cache.fit(&img.clone(), area);
        assert_eq!(cache.resamples, 1);

        assert_eq!(cache.fit(&img, Rect::new(0, 0, 4, 2)).unwrap().dimensions(), (4, 4));
        assert_eq!(cache.resamples, 2);

        // Same pixels, different decode
        cache.fit(&red_square(), Rect::new(0, 0, 4, 2));
        assert_eq!(cache.resamples, 3);
    }

    #[test]
    fn test_empty_area_is_not_fitted() {
        let mut cache = HalfblockCache::new();
        assert!(cache.fit(&red_square(), Rect::new(0, 0, 0, 4)).is_none());
        assert_eq!(cache.resamples, 0);
    }
}

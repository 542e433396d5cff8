use serde::{Deserialize, Serialize};

use crate::error::{BillError, BillResult};

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimetres to PDF points.
pub fn mm(v: f32) -> f32 {
    v * PT_PER_MM
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Components scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn unit(self) -> [f32; 3] {
        [self.0 as f32 / 255.0, self.1 as f32 / 255.0, self.2 as f32 / 255.0]
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4, portrait.
    pub const A4_PORTRAIT: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

/// Layout and styling knobs for the document renderer.
///
/// All lengths are in points, measured from the top-left corner of the page unless the
/// field name says otherwise. Every field has a default, so a partial JSON object is a valid
/// configuration (see [`RenderOptions::from_json`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub page: PageSize,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Top of the table on every page.
    pub table_top: f32,
    /// Rows never extend below `page.height - table_bottom_margin`.
    pub table_bottom_margin: f32,

    pub title_x: f32,
    pub title_baseline: f32,
    pub title_font_size: f32,

    pub font_size: f32,
    /// Line advance as a multiple of `font_size`.
    pub line_height: f32,
    pub cell_padding: f32,

    pub header_fill: Rgb,
    pub header_text: Rgb,
    /// Fill of even body rows (first, third, ...). Odd rows are unfilled.
    pub stripe_fill: Rgb,
    pub body_text: Rgb,

    pub footer_font_size: f32,
    pub footer_text: Rgb,
    /// Footer start, measured leftwards from the right page edge.
    pub footer_right_offset: f32,
    /// Footer baseline, measured upwards from the bottom page edge.
    pub footer_bottom_offset: f32,

    /// Rendering fails with [`BillError::LimitExceeded`] past this many pages.
    pub max_pages: usize,
    /// Flate-compress content streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page: PageSize::A4_PORTRAIT,
            margin_left: mm(14.0),
            margin_right: mm(14.0),
            table_top: mm(30.0),
            table_bottom_margin: mm(20.0),
            title_x: mm(14.0),
            title_baseline: mm(22.0),
            title_font_size: 18.0,
            font_size: 10.0,
            line_height: 1.15,
            cell_padding: mm(2.0),
            header_fill: Rgb(41, 128, 185),
            header_text: Rgb::WHITE,
            stripe_fill: Rgb(245, 245, 245),
            body_text: Rgb(20, 20, 20),
            footer_font_size: 10.0,
            footer_text: Rgb(100, 100, 100),
            footer_right_offset: mm(25.0),
            footer_bottom_offset: mm(10.0),
            max_pages: 10_000,
            compress: true,
        }
    }
}

impl RenderOptions {
    /// Load options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> BillResult<Self> {
        serde_json::from_str(json).map_err(|e| BillError::Render {
            message: format!("invalid render options: {e}"),
        })
    }

    /// Horizontal space available to the table.
    pub fn printable_width(&self) -> f32 {
        (self.page.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Lowest y (from the top) a row may reach.
    pub fn table_bottom(&self) -> f32 {
        self.page.height - self.table_bottom_margin
    }

    /// Line advance in points.
    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}

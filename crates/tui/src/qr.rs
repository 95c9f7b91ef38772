//! Terminal rendering of wallet request URIs.
//!
//! Two QR modules share one terminal cell using half blocks. Codes use the
//! lowest error correction level to keep the symbol small. Long request URIs
//! can still need more rows than an 80x24 terminal has.

use anyhow::{anyhow, Result};
use qrcode::{Color as Module, EcLevel, QrCode};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};

/// Foreground used for the code; the shop's wine red.
pub const WINE: Color = Color::Rgb(0x72, 0x2F, 0x37);

#[derive(Debug, Clone)]
pub struct QrOptions {
    /// Quiet zone (margin) in modules
    pub quiet_zone: usize,
    pub dark: Color,
    pub light: Color,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            quiet_zone: 2,
            dark: WINE,
            light: Color::White,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrArt {
    pub rows: Vec<String>,
    /// Width in terminal columns, quiet zone included.
    pub width: u16,
    pub dark: Color,
    pub light: Color,
}

impl QrArt {
    /// Rows in terminal cells, quiet zone included.
    pub fn height(&self) -> u16 {
        self.rows.len() as u16
    }

    pub fn to_text(&self) -> Text<'static> {
        let style = Style::default().fg(self.dark).bg(self.light);
        self.rows
            .iter()
            .map(|row| Line::from(Span::styled(row.clone(), style)))
            .collect::<Vec<_>>()
            .into()
    }
}

pub fn render(text: &str, options: &QrOptions) -> Result<QrArt> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)
        .map_err(|e| anyhow!("cannot encode {} bytes as a QR code: {e}", text.len()))?;

    let width = code.width();
    let modules = code.to_colors();
    let quiet = options.quiet_zone;
    let size = width + 2 * quiet;

    let is_dark = |x: usize, y: usize| {
        x >= quiet
            && y >= quiet
            && x < quiet + width
            && y < quiet + width
            && modules[(y - quiet) * width + (x - quiet)] == Module::Dark
    };

    let rows = (0..size)
        .step_by(2)
        .map(|y| {
            (0..size)
                .map(|x| match (is_dark(x, y), y + 1 < size && is_dark(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect::<String>()
        })
        .collect();

    Ok(QrArt {
        rows,
        width: size as u16,
        dark: options.dark,
        light: options.light,
    })
}

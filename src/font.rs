//! Font loading and string rasterization
//!
//! Each call lays out one line with fontdue and paints it into a fresh RGBA
//! image. Nothing is cached; the image is handed to the GPU and dropped with
//! the frame.

use crate::error::{InitError, RenderError};
use crate::theme;
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use std::path::{Path, PathBuf};

/// Font path used when `init.toml` doesn't name one
pub const DEFAULT_FONT_PATH: &str = "assets/font.ttf";

/// Installed fonts tried when the default font path is missing
pub fn system_font_paths() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Courier New.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
        ]
    }

    #[cfg(target_os = "windows")]
    {
        &[
            "C:\\Windows\\Fonts\\consola.ttf", // Consolas
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
    }

    #[cfg(target_os = "linux")]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        &[]
    }
}

/// Paths to try, in order. An explicitly configured font is the only candidate;
/// the default path falls back to installed system fonts.
pub fn font_candidates(configured: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![configured.to_path_buf()];
    if configured == Path::new(DEFAULT_FONT_PATH) {
        candidates.extend(system_font_paths().iter().map(PathBuf::from));
    }
    candidates
}

/// Pixel size of an image covering `width` x `height`, clipped to `max_width` columns
pub fn image_extent(width: f32, height: f32, max_width: u32) -> Option<(u32, u32)> {
    let width = width.ceil().clamp(0.0, max_width as f32) as u32;
    let height = height.ceil().clamp(0.0, u32::MAX as f32) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// A rasterized string in straight-alpha RGBA8
#[derive(Clone, Debug)]
pub struct TextImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextImage {
    /// Transparent image of the given size
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(RenderError::ImageTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    /// Paint a coverage bitmap with its top-left corner at (x, y).
    /// Pixels outside the image are dropped.
    pub fn blit_coverage(
        &mut self,
        coverage: &[u8],
        bitmap_width: usize,
        x: i32,
        y: i32,
        color: u32,
    ) {
        if bitmap_width == 0 {
            return;
        }
        let [r, g, b, a] = theme::unpack(color);

        for (row, line) in coverage.chunks(bitmap_width).enumerate() {
            let py = y as i64 + row as i64;
            if py < 0 || py >= self.height as i64 {
                continue;
            }
            for (col, &cov) in line.iter().enumerate() {
                let px = x as i64 + col as i64;
                if px < 0 || px >= self.width as i64 || cov == 0 {
                    continue;
                }
                let idx = (py as usize * self.width as usize + px as usize) * 4;
                let alpha = (cov as u16 * a as u16 / 255) as u8;
                // Overlapping glyphs keep the stronger coverage
                if alpha >= self.pixels[idx + 3] {
                    self.pixels[idx..idx + 4].copy_from_slice(&[r, g, b, alpha]);
                }
            }
        }
    }
}

/// A loaded font at a fixed pixel size
pub struct TextRasterizer {
    font: fontdue::Font,
    size_px: f32,
    layout: Layout,
}

impl TextRasterizer {
    /// Load the configured font, or the first usable system font when the
    /// default path is missing. The error reported is the configured path's.
    pub fn load(configured: &Path, size_px: f32) -> Result<Self, InitError> {
        Self::load_first(&font_candidates(configured), size_px)
    }

    /// First candidate that loads wins
    pub fn load_first(candidates: &[PathBuf], size_px: f32) -> Result<Self, InitError> {
        let mut first_err = None;
        for path in candidates {
            match Self::from_path(path, size_px) {
                Ok(rasterizer) => {
                    if first_err.is_some() {
                        tracing::info!(path = %path.display(), "loaded fallback font");
                    }
                    return Ok(rasterizer);
                }
                Err(err) => {
                    tracing::debug!(%err, "font candidate unusable");
                    first_err.get_or_insert(err);
                }
            }
        }
        Err(first_err.unwrap_or_else(|| InitError::FontRead {
            path: PathBuf::from(DEFAULT_FONT_PATH),
            source: std::io::ErrorKind::NotFound.into(),
        }))
    }

    /// Load a TTF/OTF font from disk
    pub fn from_path(path: &Path, size_px: f32) -> Result<Self, InitError> {
        let data = std::fs::read(path).map_err(|source| InitError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data, size_px).map_err(|reason| InitError::FontParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_bytes(data: &[u8], size_px: f32) -> Result<Self, &'static str> {
        let settings = fontdue::FontSettings {
            scale: size_px,
            ..Default::default()
        };
        let font = fontdue::Font::from_bytes(data, settings)?;

        Ok(Self {
            font,
            size_px,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        })
    }

    /// Rasterize one line of text in the given color.
    /// Columns past `max_width` are never allocated.
    pub fn rasterize(
        &mut self,
        text: &str,
        color: u32,
        max_width: u32,
    ) -> Result<TextImage, RenderError> {
        if text.is_empty() {
            return Err(RenderError::EmptyText);
        }

        self.layout.reset(&LayoutSettings::default());
        self.layout
            .append(&[&self.font], &TextStyle::new(text, self.size_px, 0));

        let mut width = 0.0f32;
        for glyph in self.layout.glyphs() {
            let advance = self.font.metrics(glyph.parent, self.size_px).advance_width;
            width = width
                .max(glyph.x + advance)
                .max(glyph.x + glyph.width as f32);
        }
        let (width, height) = image_extent(width, self.layout.height(), max_width)
            .ok_or_else(|| RenderError::EmptyImage(text.to_string()))?;

        let mut image = TextImage::new(width, height)?;
        for glyph in self.layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 || glyph.x >= width as f32 {
                continue;
            }
            let (_, coverage) = self.font.rasterize_config(glyph.key);
            image.blit_coverage(
                &coverage,
                glyph.width,
                glyph.x.round() as i32,
                glyph.y.round() as i32,
                color,
            );
        }

        Ok(image)
    }
}

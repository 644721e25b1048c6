//! QR code generation.
//!
//! Text is encoded at error correction level H and rendered as a square
//! greyscale image with a quiet zone. Blank text produces no image.

use std::path::Path;

use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::{Error, Result};

pub const DEFAULT_MODULE_SIZE: u32 = 8;
pub const DEFAULT_QUIET_ZONE: u32 = 4;
/// Largest image side `try_generate` will allocate.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Module matrix of an encoded code, row-major, `true` for dark modules.
struct Modules {
    width: usize,
    dark: Vec<bool>,
}

impl Modules {
    fn encode(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H)
            .map_err(|_| Error::TextTooLong)?;

        Ok(Modules {
            width: code.width(),
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        })
    }

    /// Dark state of the module at (`r`, `c`) in a grid padded by `qz` light modules.
    fn padded(&self, r: usize, c: usize, qz: usize) -> bool {
        let w = self.width;
        if r < qz || c < qz || r >= qz + w || c >= qz + w {
            return false;
        }
        self.dark[(r - qz) * w + (c - qz)]
    }
}

/// Side in pixels of a `width` module code padded by `quiet_zone` modules.
fn image_side(width: usize, quiet_zone: u32, module_sz: u32) -> Result<u32> {
    let side = u64::from(quiet_zone)
        .checked_mul(2)
        .and_then(|qz| qz.checked_add(width as u64))
        .and_then(|modules| modules.checked_mul(u64::from(module_sz)))
        .unwrap_or(u64::MAX);

    match u32::try_from(side) {
        Ok(side) if side <= MAX_IMAGE_SIDE => Ok(side),
        _ => Err(Error::ImageTooLarge(side)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    /// Pixels per module edge.
    pub module_size: u32,
    /// Light border width, in modules.
    pub quiet_zone: u32,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
        }
    }
}

impl Generator {
    /// Renders `text` as a QR image, or `None` for blank or oversized text.
    pub fn generate(&self, text: &str) -> Option<GrayImage> {
        match self.try_generate(text) {
            Ok(img) => Some(img),
            Err(Error::EmptyText) => None,
            Err(e) => {
                log::warn!("cannot generate QR code: {e}");
                None
            }
        }
    }

    pub fn try_generate(&self, text: &str) -> Result<GrayImage> {
        let modules = Modules::encode(text)?;
        let module_sz = self.module_size.max(1);
        let qz = self.quiet_zone as usize;
        let total_sz = image_side(modules.width, self.quiet_zone, module_sz)?;

        let canvas = GrayImage::from_fn(total_sz, total_sz, |x, y| {
            let r = (y / module_sz) as usize;
            let c = (x / module_sz) as usize;
            if modules.padded(r, c, qz) {
                Luma([0])
            } else {
                Luma([255])
            }
        });

        Ok(canvas)
    }

    /// Renders `text` for a dark terminal, two module rows per line.
    pub fn render_text(&self, text: &str) -> Option<String> {
        let encoded = Modules::encode(text)
            .and_then(|m| image_side(m.width, self.quiet_zone, 1).map(|_| m));
        let modules = match encoded {
            Ok(m) => m,
            Err(Error::EmptyText) => return None,
            Err(e) => {
                log::warn!("cannot generate QR code: {e}");
                return None;
            }
        };

        let qz = self.quiet_zone as usize;
        let total = modules.width + 2 * qz;

        // light modules are drawn, dark ones are left as terminal background
        let mut canvas = String::new();
        for r in (0..total).step_by(2) {
            for c in 0..total {
                let top = !modules.padded(r, c, qz);
                let bottom = r + 1 < total && !modules.padded(r + 1, c, qz);
                canvas.push(match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            }
            canvas.push('\n');
        }

        Some(canvas)
    }

    /// Writes `text` as a PNG at `path`.
    pub fn save(&self, text: &str, path: &Path) -> Result<()> {
        let img = self.try_generate(text)?;
        img.save(path)?;
        log::info!("saved QR code to {}", path.display());
        Ok(())
    }
}

/// Renders `text` with the default module size and quiet zone.
pub fn generate(text: &str) -> Option<GrayImage> {
    Generator::default().generate(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_produces_nothing() {
        assert!(generate("").is_none());
        assert!(generate("   ").is_none());
        assert!(generate("\t\n").is_none());
    }

    #[test]
    fn url_produces_square_image() {
        let img = generate("https://example.com").expect("image");
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % DEFAULT_MODULE_SIZE, 0);
    }

    #[test]
    fn quiet_zone_is_light() {
        let img = generate("quiet").unwrap();
        let border = DEFAULT_QUIET_ZONE * DEFAULT_MODULE_SIZE;
        for i in 0..img.width() {
            assert_eq!(img.get_pixel(i, 0)[0], 255);
            assert_eq!(img.get_pixel(0, i)[0], 255);
            assert_eq!(img.get_pixel(i, border - 1)[0], 255);
        }
        // top-left finder pattern starts right after the quiet zone
        assert_eq!(img.get_pixel(border, border)[0], 0);
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(generate("same input"), generate("same input"));
    }

    #[test]
    fn level_h_makes_larger_codes_than_plain_text_needs() {
        // level H holds 7 bytes at version 1, so 20 bytes spill into a larger version
        let small = generate("abc").unwrap();
        let larger = generate("abcdefghijklmnopqrst").unwrap();
        assert!(larger.width() > small.width());
    }

    #[test]
    fn oversized_text_produces_nothing() {
        let text = "x".repeat(4000);
        assert!(generate(&text).is_none());
        assert!(matches!(
            Generator::default().try_generate(&text),
            Err(Error::TextTooLong)
        ));
    }

    #[test]
    fn module_size_scales_image() {
        let small = Generator { module_size: 2, quiet_zone: 0 }.generate("scale").unwrap();
        let large = Generator { module_size: 6, quiet_zone: 0 }.generate("scale").unwrap();
        assert_eq!(large.width(), small.width() * 3);
    }

    #[test]
    fn oversized_module_size_is_rejected() {
        let huge = Generator { module_size: u32::MAX / 8, quiet_zone: 4 };
        assert!(huge.generate("a").is_none());
        assert!(matches!(huge.try_generate("a"), Err(Error::ImageTooLarge(_))));

        // version 1 at level H is 21 modules, 29 with the quiet zone
        let over = Generator { module_size: MAX_IMAGE_SIDE / 29 + 1, quiet_zone: 4 };
        assert!(matches!(over.try_generate("a"), Err(Error::ImageTooLarge(_))));

        let wide_border = Generator { module_size: 1, quiet_zone: u32::MAX };
        assert!(matches!(wide_border.try_generate("a"), Err(Error::ImageTooLarge(_))));
        assert!(wide_border.render_text("a").is_none());
    }

    #[test]
    fn text_rendering_has_two_rows_per_line() {
        let generator = Generator::default();
        let rendered = generator.render_text("terminal").unwrap();
        let img = Generator { module_size: 1, ..generator }.generate("terminal").unwrap();
        let lines = rendered.lines().count() as u32;
        assert_eq!(lines, img.height().div_ceil(2));
        assert!(generator.render_text("  ").is_none());
    }

    #[test]
    fn save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");
        Generator::default().save("saved", &path).unwrap();
        assert!(image::open(&path).is_ok());
    }
}

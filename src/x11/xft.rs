//! Thin owners for the Xft handles used to draw bar text.

use crate::errors::X11Error;
use std::ffi::CString;
use x11::xft;
use x11::xlib::{Colormap, Display, Drawable, Visual};
use x11::xrender::XRenderColor;

/// An open Xft font. Metrics are read once when the font is opened.
pub struct Font {
    raw: *mut xft::XftFont,
    display: *mut Display,
    ascent: i32,
    descent: i32,
}

impl Font {
    pub fn open(display: *mut Display, screen: i32, name: &str) -> Result<Self, X11Error> {
        let pattern = CString::new(name).map_err(|_| X11Error::FontLoadFailed(name.to_string()))?;
        let raw = unsafe { xft::XftFontOpenName(display, screen, pattern.as_ptr()) };
        if raw.is_null() {
            return Err(X11Error::FontLoadFailed(name.to_string()));
        }

        let (ascent, descent) = unsafe { ((*raw).ascent, (*raw).descent) };
        Ok(Self {
            raw,
            display,
            ascent,
            descent,
        })
    }

    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }

    pub fn ascent(&self) -> i32 {
        self.ascent
    }

    /// Horizontal advance of `text` in pixels.
    pub fn text_width(&self, text: &str) -> i32 {
        if text.is_empty() {
            return 0;
        }
        let mut extents = unsafe { std::mem::zeroed() };
        unsafe {
            xft::XftTextExtentsUtf8(self.display, self.raw, text.as_ptr(), text.len() as i32, &mut extents);
        }
        i32::from(extents.xOff)
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe { xft::XftFontClose(self.display, self.raw) };
    }
}

/// Expands `0xRRGGBB` plus an 8-bit alpha into 16-bit render channels.
pub fn render_color(rgb: u32, alpha: u8) -> XRenderColor {
    let widen = |channel: u32| {
        let channel = (channel & 0xff) as u16;
        channel << 8 | channel
    };
    XRenderColor {
        red: widen(rgb >> 16),
        green: widen(rgb >> 8),
        blue: widen(rgb),
        alpha: widen(u32::from(alpha)),
    }
}

/// An Xft draw bound to one window.
pub struct TextSurface {
    raw: *mut xft::XftDraw,
}

impl TextSurface {
    pub fn new(
        display: *mut Display,
        drawable: Drawable,
        visual: *mut Visual,
        colormap: Colormap,
    ) -> Result<Self, X11Error> {
        let raw = unsafe { xft::XftDrawCreate(display, drawable, visual, colormap) };
        if raw.is_null() {
            return Err(X11Error::DrawCreateFailed);
        }
        Ok(Self { raw })
    }

    /// Draws `text` with its baseline at `baseline`.
    pub fn draw(&self, font: &Font, rgb: u32, alpha: u8, x: i32, baseline: i32, text: &str) {
        let value = render_color(rgb, alpha);
        unsafe {
            let display = xft::XftDrawDisplay(self.raw);
            let visual = xft::XftDrawVisual(self.raw);
            let colormap = xft::XftDrawColormap(self.raw);

            let mut color: xft::XftColor = std::mem::zeroed();
            if xft::XftColorAllocValue(display, visual, colormap, &value, &mut color) == 0 {
                return;
            }
            xft::XftDrawStringUtf8(self.raw, &color, font.raw, x, baseline, text.as_ptr(), text.len() as i32);
            xft::XftColorFree(display, visual, colormap, &mut color);
        }
    }
}

impl Drop for TextSurface {
    fn drop(&mut self) {
        unsafe { xft::XftDrawDestroy(self.raw) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_widened_to_sixteen_bits() {
        let color = render_color(0x42a5f5, 0xff);
        assert_eq!(color.red, 0x4242);
        assert_eq!(color.green, 0xa5a5);
        assert_eq!(color.blue, 0xf5f5);
        assert_eq!(color.alpha, 0xffff);
    }

    #[test]
    fn translucent_alpha_is_kept() {
        assert_eq!(render_color(0, 0x80).alpha, 0x8080);
        assert_eq!(render_color(0xffffff, 0).alpha, 0);
    }
}

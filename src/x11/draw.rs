//! Bar windows: backgrounds and underlines go through x11rb, text through
//! Xft on a second Xlib connection.

use super::xft::{Font, TextSurface};
use crate::bar::{BarCell, BarModel};
use crate::errors::{WmResult, X11Error};
use crate::layout::Rect;
use std::mem::ManuallyDrop;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ChangeGCAux, ConnectionExt, Gcontext, Rectangle, Window};
use x11rb::rust_connection::RustConnection;

/// Xlib display plus the bar font opened on it.
pub struct TextRenderer {
    display: *mut x11::xlib::Display,
    screen: i32,
    font: ManuallyDrop<Font>,
}

impl TextRenderer {
    pub fn open(font_name: &str) -> Result<Self, X11Error> {
        let display = unsafe { x11::xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return Err(X11Error::DisplayOpenFailed);
        }
        let screen = unsafe { x11::xlib::XDefaultScreen(display) };

        let font = match Font::open(display, screen, font_name) {
            Ok(font) => font,
            Err(e) => {
                unsafe { x11::xlib::XCloseDisplay(display) };
                return Err(e);
            }
        };

        Ok(Self {
            display,
            screen,
            font: ManuallyDrop::new(font),
        })
    }

    pub fn font_height(&self) -> i32 {
        self.font.height()
    }

    pub fn text_width(&self, text: &str) -> i32 {
        self.font.text_width(text)
    }

    fn surface(&self, window: Window) -> Result<TextSurface, X11Error> {
        let visual = unsafe { x11::xlib::XDefaultVisual(self.display, self.screen) };
        let colormap = unsafe { x11::xlib::XDefaultColormap(self.display, self.screen) };
        TextSurface::new(self.display, window as x11::xlib::Drawable, visual, colormap)
    }

    fn flush(&self) {
        unsafe {
            x11::xlib::XFlush(self.display);
        }
    }
}

impl Drop for TextRenderer {
    fn drop(&mut self) {
        unsafe {
            ManuallyDrop::drop(&mut self.font);
            x11::xlib::XCloseDisplay(self.display);
        }
    }
}

pub struct BarSurface {
    pub gc: Gcontext,
    text_surface: TextSurface,
}

impl BarSurface {
    pub fn new(text: &TextRenderer, window: Window, gc: Gcontext) -> Result<Self, X11Error> {
        Ok(Self {
            gc,
            text_surface: text.surface(window)?,
        })
    }
}

/// Longest prefix of `text` that `measure` says fits in `max_width`.
pub fn fit_text(text: &str, max_width: i32, measure: impl Fn(&str) -> i32) -> &str {
    if measure(text) <= max_width {
        return text;
    }
    let mut fitted = "";
    for (index, c) in text.char_indices() {
        let end = index + c.len_utf8();
        if measure(&text[..end]) > max_width {
            break;
        }
        fitted = &text[..end];
    }
    fitted
}

fn fill(
    connection: &RustConnection,
    window: Window,
    gc: Gcontext,
    color: u32,
    area: Rect,
) -> WmResult<()> {
    if area.width <= 0 || area.height <= 0 {
        return Ok(());
    }
    connection.change_gc(gc, &ChangeGCAux::new().foreground(color))?;
    connection.poly_fill_rectangle(
        window,
        gc,
        &[Rectangle {
            x: area.x as i16,
            y: area.y as i16,
            width: area.width as u16,
            height: area.height as u16,
        }],
    )?;
    Ok(())
}

fn underline(
    connection: &RustConnection,
    window: Window,
    surface: &BarSurface,
    text: &TextRenderer,
    cell: &BarCell,
    height: i32,
) -> WmResult<()> {
    let underline_height = (text.font_height() / 8).max(1);
    let bottom_gap = 3;
    let underline_padding = 4;
    fill(
        connection,
        window,
        surface.gc,
        cell.scheme.border,
        Rect::new(
            cell.x + underline_padding / 2,
            height - underline_height - bottom_gap,
            cell.width - underline_padding,
            underline_height,
        ),
    )
}

/// Renders `model` into a bar window `height` pixels tall.
pub fn paint_bar(
    connection: &RustConnection,
    window: Window,
    surface: &BarSurface,
    text: &TextRenderer,
    model: &BarModel,
    height: i32,
) -> WmResult<()> {
    fill(connection, window, surface.gc, model.normal.background, Rect::new(0, 0, model.width, height))?;

    for cell in &model.cells {
        fill(connection, window, surface.gc, cell.scheme.background, Rect::new(cell.x, 0, cell.width, height))?;
        if cell.underline {
            underline(connection, window, surface, text, cell, height)?;
        }
    }

    let mut x = model.status_x;
    let mut status_widths = Vec::with_capacity(model.status.len());
    for run in &model.status {
        let width = text.text_width(&run.text);
        if let Some(background) = run.background {
            fill(connection, window, surface.gc, background.rgb, Rect::new(x, 0, width, height))?;
        }
        status_widths.push(width);
        x += width;
    }

    // Text is drawn on the other connection, so the fills must land first.
    connection.flush()?;

    let baseline = (height - text.font_height()) / 2 + text.font.ascent();
    let half_padding = model.padding / 2;
    for cell in &model.cells {
        let room = cell.width - model.padding;
        let label = fit_text(&cell.text, room, |s| text.text_width(s));
        if label.is_empty() {
            continue;
        }
        surface.text_surface.draw(
            &text.font,
            cell.scheme.foreground,
            0xff,
            cell.x + half_padding,
            baseline,
            label,
        );
    }

    let mut x = model.status_x;
    for (run, width) in model.status.iter().zip(status_widths) {
        let (color, alpha) = run
            .foreground
            .map_or((model.normal.foreground, 0xff), |color| (color.rgb, color.alpha));
        surface.text_surface.draw(&text.font, color, alpha, x, baseline, &run.text);
        x += width;
    }

    text.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> i32 {
        text.chars().count() as i32 * 10
    }

    #[test]
    fn short_text_is_kept_whole() {
        assert_eq!(fit_text("term", 40, chars), "term");
    }

    #[test]
    fn long_text_is_cut_at_a_char_boundary() {
        assert_eq!(fit_text("terminal", 35, chars), "ter");
        assert_eq!(fit_text("ünïcode", 25, chars), "ün");
    }

    #[test]
    fn nothing_fits_in_no_room() {
        assert_eq!(fit_text("x", 0, chars), "");
        assert_eq!(fit_text("x", -5, chars), "");
    }
}

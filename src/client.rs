use crate::layout::Rect;
use crate::size_hints::SizeHints;
use x11rb::protocol::xproto::Window;

pub type TagMask = u32;

/// Titles longer than this are cut at the nearest character boundary.
pub const MAX_TITLE_BYTES: usize = 256;
/// Title shown for clients that publish no usable name.
pub const BROKEN_TITLE: &str = "broken";

#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub min_aspect: f32,
    pub max_aspect: f32,
    pub x_position: i32,
    pub y_position: i32,
    pub width: i32,
    pub height: i32,
    pub old_x_position: i32,
    pub old_y_position: i32,
    pub old_width: i32,
    pub old_height: i32,
    pub base_width: i32,
    pub base_height: i32,
    pub increment_width: i32,
    pub increment_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub hints_valid: bool,
    pub border_width: i32,
    pub old_border_width: i32,
    pub tags: TagMask,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    pub old_state: bool,
    pub is_fullscreen: bool,
    pub is_global: bool,
    pub is_no_border: bool,
    pub is_scratchpad: bool,
    /// Mirrors the iconic `WM_STATE` set by hide.
    pub is_hidden: bool,
    /// Width of this client's task cell the last time the bar was laid out.
    pub task_width: i32,
    pub monitor_index: usize,
    pub window: Window,
}

/// Limits a geometry is clamped against before it reaches the server.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub screen_width: i32,
    pub screen_height: i32,
    pub work_area: Rect,
    /// Neither side of a client may shrink below this (the bar height).
    pub min_size: i32,
}

impl Client {
    pub fn new(window: Window, monitor_index: usize, tags: TagMask) -> Self {
        Self {
            name: String::new(),
            min_aspect: 0.0,
            max_aspect: 0.0,
            x_position: 0,
            y_position: 0,
            width: 0,
            height: 0,
            old_x_position: 0,
            old_y_position: 0,
            old_width: 0,
            old_height: 0,
            base_width: 0,
            base_height: 0,
            increment_width: 0,
            increment_height: 0,
            max_width: 0,
            max_height: 0,
            min_width: 0,
            min_height: 0,
            hints_valid: false,
            border_width: 0,
            old_border_width: 0,
            tags,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            is_global: false,
            is_no_border: false,
            is_scratchpad: false,
            is_hidden: false,
            task_width: 0,
            monitor_index,
            window,
        }
    }

    pub fn width_with_border(&self) -> i32 {
        self.width + 2 * self.border_width
    }

    pub fn height_with_border(&self) -> i32 {
        self.height + 2 * self.border_width
    }

    /// Inner geometry, border excluded.
    pub fn geometry(&self) -> Rect {
        Rect::new(self.x_position, self.y_position, self.width, self.height)
    }

    /// Stores `geometry` as current, keeping the previous one in the `old_*` fields.
    pub fn set_geometry(&mut self, geometry: Rect) {
        self.old_x_position = self.x_position;
        self.old_y_position = self.y_position;
        self.old_width = self.width;
        self.old_height = self.height;
        self.x_position = geometry.x;
        self.y_position = geometry.y;
        self.width = geometry.width;
        self.height = geometry.height;
    }

    pub fn set_title(&mut self, title: &str) {
        let mut end = title.len().min(MAX_TITLE_BYTES - 1);
        while !title.is_char_boundary(end) {
            end -= 1;
        }
        self.name = if end == 0 {
            BROKEN_TITLE.to_string()
        } else {
            title[..end].to_string()
        };
    }

    pub fn update_size_hints(&mut self, hints: SizeHints) {
        self.base_width = hints.base_width;
        self.base_height = hints.base_height;
        self.increment_width = hints.increment_width;
        self.increment_height = hints.increment_height;
        self.max_width = hints.max_width;
        self.max_height = hints.max_height;
        self.min_width = hints.min_width;
        self.min_height = hints.min_height;
        self.min_aspect = hints.min_aspect;
        self.max_aspect = hints.max_aspect;
        self.is_fixed = hints.is_fixed();
        self.hints_valid = true;
    }

    /// Clamps a requested geometry to the visible area and, for floating
    /// clients, to the client's own size hints (ICCCM 4.1.2.3).
    ///
    /// Interactive requests are only kept on the screen; layout requests are
    /// kept overlapping the work area.
    pub fn constrain(&self, requested: Rect, interact: bool, bounds: &Bounds) -> Rect {
        let Rect {
            mut x,
            mut y,
            mut width,
            mut height,
        } = requested;
        let border = self.border_width;

        width = width.max(1);
        height = height.max(1);

        if interact {
            if x > bounds.screen_width {
                x = bounds.screen_width - self.width_with_border();
            }
            if y > bounds.screen_height {
                y = bounds.screen_height - self.height_with_border();
            }
            if x + width + 2 * border < 0 {
                x = 0;
            }
            if y + height + 2 * border < 0 {
                y = 0;
            }
        } else {
            let area = bounds.work_area;
            if x >= area.x + area.width {
                x = area.x + area.width - self.width_with_border();
            }
            if y >= area.y + area.height {
                y = area.y + area.height - self.height_with_border();
            }
            if x + width + 2 * border <= area.x {
                x = area.x;
            }
            if y + height + 2 * border <= area.y {
                y = area.y;
            }
        }

        height = height.max(bounds.min_size);
        width = width.max(bounds.min_size);

        if self.is_floating {
            let base_is_min =
                self.base_width == self.min_width && self.base_height == self.min_height;
            if !base_is_min {
                width -= self.base_width;
                height -= self.base_height;
            }

            if self.min_aspect > 0.0 && self.max_aspect > 0.0 {
                if self.max_aspect < width as f32 / height as f32 {
                    width = (height as f32 * self.max_aspect + 0.5) as i32;
                } else if self.min_aspect < height as f32 / width as f32 {
                    height = (width as f32 * self.min_aspect + 0.5) as i32;
                }
            }

            if base_is_min {
                width -= self.base_width;
                height -= self.base_height;
            }

            if self.increment_width > 0 {
                width -= width % self.increment_width;
            }
            if self.increment_height > 0 {
                height -= height % self.increment_height;
            }

            width = (width + self.base_width).max(self.min_width);
            height = (height + self.base_height).max(self.min_height);
            if self.max_width > 0 {
                width = width.min(self.max_width);
            }
            if self.max_height > 0 {
                height = height.min(self.max_height);
            }
        }

        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds {
            screen_width: 1920,
            screen_height: 1080,
            work_area: Rect::new(0, 20, 1920, 1060),
            min_size: 20,
        }
    }

    #[test]
    fn empty_title_becomes_broken() {
        let mut client = Client::new(1, 0, 1);
        client.set_title("");
        assert_eq!(client.name, BROKEN_TITLE);
    }

    #[test]
    fn long_titles_are_bounded_on_a_char_boundary() {
        let mut client = Client::new(1, 0, 1);
        client.set_title(&"é".repeat(300));
        assert!(client.name.len() < MAX_TITLE_BYTES);
        assert!(client.name.chars().all(|c| c == 'é'));
    }

    #[test]
    fn tiled_clients_ignore_size_hints() {
        let mut client = Client::new(1, 0, 1);
        client.update_size_hints(SizeHints {
            increment_width: 7,
            increment_height: 13,
            ..SizeHints::default()
        });
        let requested = Rect::new(0, 20, 500, 400);
        assert_eq!(client.constrain(requested, false, &bounds()), requested);
    }

    #[test]
    fn floating_clients_snap_to_increments() {
        let mut client = Client::new(1, 0, 1);
        client.is_floating = true;
        client.update_size_hints(SizeHints {
            base_width: 4,
            base_height: 4,
            increment_width: 10,
            increment_height: 10,
            ..SizeHints::default()
        });
        let result = client.constrain(Rect::new(100, 100, 255, 199), true, &bounds());
        assert_eq!((result.width, result.height), (254, 194));
    }

    #[test]
    fn sizes_never_drop_below_the_bar_height() {
        let client = Client::new(1, 0, 1);
        let result = client.constrain(Rect::new(10, 30, 3, 0), false, &bounds());
        assert_eq!((result.width, result.height), (20, 20));
    }

    #[test]
    fn layout_requests_are_pulled_back_into_the_work_area() {
        let mut client = Client::new(1, 0, 1);
        client.width = 100;
        client.height = 100;
        client.border_width = 2;
        let result = client.constrain(Rect::new(5000, 30, 100, 100), false, &bounds());
        assert_eq!(result.x, 1920 - 104);
    }
}

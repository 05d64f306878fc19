use crate::Config;
use crate::client::{Client, TagMask};
use crate::layout::{LayoutType, Rect};
use x11rb::protocol::xproto::Window;

/// Pertag slot used while every tag is shown at once.
pub const ALL_TAGS_SLOT: usize = 0;

/// Layout parameters remembered for one tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PertagEntry {
    pub num_master: i32,
    pub master_factor: f32,
    pub layouts: [LayoutType; 2],
    pub selected_layout: usize,
    pub show_bar: bool,
}

/// Per-tag settings of a monitor. `entries` has one slot per tag plus
/// [`ALL_TAGS_SLOT`] in front, so tag `i` lives at `i + 1`.
#[derive(Debug, Clone)]
pub struct Pertag {
    pub current_tag: usize,
    pub previous_tag: usize,
    entries: Vec<PertagEntry>,
}

impl Pertag {
    pub fn new(tag_count: usize, initial: PertagEntry) -> Self {
        Self {
            current_tag: 1,
            previous_tag: 1,
            entries: vec![initial; tag_count + 1],
        }
    }

    /// Slot for a non-empty view mask: the lowest set tag, or
    /// [`ALL_TAGS_SLOT`] when the mask covers every tag.
    pub fn slot_for_mask(mask: TagMask, all_tags: TagMask) -> usize {
        if mask & all_tags == all_tags {
            ALL_TAGS_SLOT
        } else {
            mask.trailing_zeros() as usize + 1
        }
    }

    pub fn current(&self) -> &PertagEntry {
        &self.entries[self.current_tag]
    }

    pub fn current_mut(&mut self) -> &mut PertagEntry {
        &mut self.entries[self.current_tag]
    }

    pub fn entry(&self, slot: usize) -> Option<&PertagEntry> {
        self.entries.get(slot)
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub num: usize,
    pub screen: Rect,
    pub work_area: Rect,
    pub bar_y: i32,
    pub bar_window: Option<Window>,
    pub show_bar: bool,
    pub top_bar: bool,
    pub tagset: [TagMask; 2],
    pub selected_tags_index: usize,
    pub master_factor: f32,
    pub num_master: i32,
    pub layouts: [LayoutType; 2],
    pub selected_layout: usize,
    pub layout_symbol: String,
    pub pertag: Pertag,
    /// Tiling order.
    pub clients: Vec<Window>,
    /// Focus history, most recent first.
    pub stack: Vec<Window>,
    pub selected_client: Option<Window>,
    pub is_overview: bool,
}

impl Monitor {
    pub fn new(config: &Config, num: usize, screen: Rect) -> Self {
        let first = config.layouts.first().copied().unwrap_or(LayoutType::Tiling);
        let second = config.layouts.get(1).copied().unwrap_or(first);
        let layouts = [first, second];

        let pertag = Pertag::new(
            config.tags.len(),
            PertagEntry {
                num_master: config.num_master,
                master_factor: config.master_factor,
                layouts,
                selected_layout: 0,
                show_bar: config.show_bar,
            },
        );

        Self {
            num,
            screen,
            work_area: screen,
            bar_y: 0,
            bar_window: None,
            show_bar: config.show_bar,
            top_bar: config.top_bar,
            tagset: [1, 1],
            selected_tags_index: 0,
            master_factor: config.master_factor,
            num_master: config.num_master,
            layouts,
            selected_layout: 0,
            layout_symbol: first.new().symbol().to_string(),
            pertag,
            clients: Vec::new(),
            stack: Vec::new(),
            selected_client: None,
            is_overview: false,
        }
    }

    pub fn active_tags(&self) -> TagMask {
        self.tagset[self.selected_tags_index]
    }

    pub fn current_layout(&self) -> LayoutType {
        self.layouts[self.selected_layout]
    }

    /// Overview shows everything; otherwise a client is visible when it is
    /// global or shares a tag with the active set.
    pub fn is_visible(&self, client: &Client) -> bool {
        self.is_overview || client.is_global || client.tags & self.active_tags() != 0
    }

    /// Recomputes the work area and bar position after a geometry or bar
    /// visibility change.
    pub fn update_bar_position(&mut self, bar_height: i32) {
        self.work_area = self.screen;
        if self.show_bar {
            self.work_area.height -= bar_height;
            if self.top_bar {
                self.bar_y = self.work_area.y;
                self.work_area.y += bar_height;
            } else {
                self.bar_y = self.work_area.y + self.work_area.height;
            }
        } else {
            self.bar_y = -bar_height;
        }
    }

    pub fn bar_geometry(&self, bar_height: i32) -> Rect {
        Rect::new(self.work_area.x, self.bar_y, self.work_area.width, bar_height)
    }

    /// Area of the overlap between `rect` and this monitor's work area.
    pub fn overlap(&self, rect: &Rect) -> i64 {
        self.work_area.intersection_area(rect)
    }
}

/// Drops zero-sized and duplicate screens and orders the rest top to
/// bottom, then left to right.
pub fn unique_geometries(screens: impl IntoIterator<Item = Rect>) -> Vec<Rect> {
    let mut geometries = Vec::<Rect>::new();

    for screen in screens {
        let has_valid_dimensions = screen.width > 0 && screen.height > 0;
        if !has_valid_dimensions {
            continue;
        }

        let is_duplicate_monitor = geometries.iter().any(|geometry| *geometry == screen);
        if !is_duplicate_monitor {
            geometries.push(screen);
        }
    }

    geometries.sort_by(|a, b| match a.y.cmp(&b.y) {
        std::cmp::Ordering::Equal => a.x.cmp(&b.x),
        other => other,
    });

    geometries
}

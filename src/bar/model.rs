use super::status::{StatusRun, status_width};
use crate::ColorScheme;
use crate::client::TagMask;
use x11rb::protocol::xproto::Window;

/// Task titles are never given more room than this many spaces would take.
const TASK_WIDTH_TEMPLATE: &str = "          ";
const OVERFLOW_MARKER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Tag(usize),
    /// The layout symbol, or the single overview label.
    LayoutSymbol,
    Task(Window),
    Empty,
}

/// What a click at some x position on the bar landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarHit {
    Tag(usize),
    LayoutSymbol,
    Task(Window),
    /// `offset` is measured from the left edge of the status text.
    Status { offset: i32 },
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Selected,
    Hidden,
    Normal,
}

#[derive(Debug, Clone)]
pub struct TaskEntry<'a> {
    pub window: Window,
    pub title: &'a str,
    pub state: TaskState,
}

#[derive(Debug, Clone, Copy)]
pub struct BarSchemes {
    pub normal: ColorScheme,
    pub selected: ColorScheme,
    pub hidden: ColorScheme,
    pub tag_normal: ColorScheme,
    pub tag_selected: ColorScheme,
}

/// Monitor state the bar is rendered from.
#[derive(Debug, Clone)]
pub struct BarInput<'a> {
    pub width: i32,
    pub tags: &'a [String],
    pub overview_label: &'a str,
    pub is_overview: bool,
    pub active_tags: TagMask,
    pub occupied_tags: TagMask,
    pub urgent_tags: TagMask,
    pub layout_symbol: &'a str,
    pub tasks: Vec<TaskEntry<'a>>,
    pub status: &'a [StatusRun],
    pub schemes: BarSchemes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarCell {
    pub region: Region,
    pub x: i32,
    pub width: i32,
    pub text: String,
    pub scheme: ColorScheme,
    /// Draws an indicator line under the cell.
    pub underline: bool,
}

/// Laid-out bar contents, shared by drawing and click hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarModel {
    pub width: i32,
    /// Horizontal text padding inside each cell.
    pub padding: i32,
    pub cells: Vec<BarCell>,
    pub status: Vec<StatusRun>,
    pub status_x: i32,
    pub status_width: i32,
    pub normal: ColorScheme,
}

impl BarModel {
    /// `padding` is the total horizontal padding around cell text, usually
    /// the font height.
    pub fn build(input: &BarInput, padding: i32, measure: impl Fn(&str) -> i32) -> Self {
        let cell_width = |text: &str| measure(text) + padding;
        let schemes = &input.schemes;
        let mut cells = Vec::new();
        let mut x = 0;

        let status_width = status_width(input.status, &measure);
        let status_x = input.width - status_width;

        if input.is_overview {
            let width = cell_width(input.overview_label);
            cells.push(BarCell {
                region: Region::LayoutSymbol,
                x,
                width,
                text: input.overview_label.to_string(),
                scheme: schemes.tag_selected,
                underline: true,
            });
            x += width;
        } else {
            for (index, tag) in input.tags.iter().enumerate() {
                let bit = 1 << index;
                let is_active = input.active_tags & bit != 0;
                if input.occupied_tags & bit == 0 && !is_active {
                    continue;
                }

                let mut scheme = if is_active {
                    schemes.tag_selected
                } else {
                    schemes.tag_normal
                };
                if input.urgent_tags & bit != 0 {
                    std::mem::swap(&mut scheme.foreground, &mut scheme.background);
                }

                let width = cell_width(tag);
                cells.push(BarCell {
                    region: Region::Tag(index),
                    x,
                    width,
                    text: tag.clone(),
                    scheme,
                    underline: is_active,
                });
                x += width;
            }
        }

        let width = cell_width(input.layout_symbol);
        cells.push(BarCell {
            region: Region::LayoutSymbol,
            x,
            width,
            text: input.layout_symbol.to_string(),
            scheme: schemes.normal,
            underline: false,
        });
        x += width;

        let max_task_width = cell_width(TASK_WIDTH_TEMPLATE);
        for task in &input.tasks {
            let scheme = match task.state {
                TaskState::Selected => schemes.selected,
                TaskState::Hidden => schemes.hidden,
                TaskState::Normal => schemes.normal,
            };
            let available = status_x - x;
            let width = cell_width(task.title).min(max_task_width);

            if width > available {
                cells.push(BarCell {
                    region: Region::Task(task.window),
                    x,
                    width: available.max(0),
                    text: OVERFLOW_MARKER.to_string(),
                    scheme,
                    underline: false,
                });
                x += available.max(0);
                break;
            }

            cells.push(BarCell {
                region: Region::Task(task.window),
                x,
                width,
                text: task.title.to_string(),
                scheme,
                underline: false,
            });
            x += width;
        }

        if status_x > x {
            cells.push(BarCell {
                region: Region::Empty,
                x,
                width: status_x - x,
                text: String::new(),
                scheme: schemes.normal,
                underline: false,
            });
        }

        Self {
            width: input.width,
            padding,
            cells,
            status: input.status.to_vec(),
            status_x,
            status_width,
            normal: schemes.normal,
        }
    }

    pub fn hit(&self, x: i32) -> BarHit {
        if x >= self.status_x && self.status_width > 0 {
            return BarHit::Status {
                offset: x - self.status_x,
            };
        }

        let cell = self
            .cells
            .iter()
            .find(|cell| x >= cell.x && x < cell.x + cell.width);

        match cell.map(|cell| cell.region) {
            Some(Region::Tag(index)) => BarHit::Tag(index),
            Some(Region::LayoutSymbol) => BarHit::LayoutSymbol,
            Some(Region::Task(window)) => BarHit::Task(window),
            Some(Region::Empty) | None => BarHit::Empty,
        }
    }

    /// Width given to `window`'s task cell, zero when it did not fit.
    pub fn task_width(&self, window: Window) -> i32 {
        self.cells
            .iter()
            .find(|cell| cell.region == Region::Task(window))
            .map_or(0, |cell| cell.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::status::parse_status;

    fn measure(text: &str) -> i32 {
        text.chars().count() as i32 * 10
    }

    fn scheme(foreground: u32) -> ColorScheme {
        ColorScheme {
            foreground,
            background: 0,
            border: 0,
        }
    }

    fn schemes() -> BarSchemes {
        BarSchemes {
            normal: scheme(1),
            selected: scheme(2),
            hidden: scheme(3),
            tag_normal: scheme(4),
            tag_selected: scheme(5),
        }
    }

    fn input<'a>(tags: &'a [String], status: &'a [StatusRun], tasks: Vec<TaskEntry<'a>>) -> BarInput<'a> {
        BarInput {
            width: 1000,
            tags,
            overview_label: "OVERVIEW",
            is_overview: false,
            active_tags: 0b001,
            occupied_tags: 0b100,
            urgent_tags: 0,
            layout_symbol: "[]=",
            tasks,
            status,
            schemes: schemes(),
        }
    }

    fn tags() -> Vec<String> {
        ["1", "2", "3"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vacant_tags_are_skipped() {
        let tags = tags();
        let model = BarModel::build(&input(&tags, &[], vec![]), 10, measure);
        let regions: Vec<_> = model.cells.iter().map(|c| c.region).collect();
        assert_eq!(
            regions,
            vec![Region::Tag(0), Region::Tag(2), Region::LayoutSymbol, Region::Empty]
        );
        assert_eq!(model.cells[1].x, 20);
        assert_eq!(model.cells[0].scheme.foreground, 5);
        assert_eq!(model.cells[1].scheme.foreground, 4);
    }

    #[test]
    fn urgent_tags_swap_colours() {
        let tags = tags();
        let mut bar = input(&tags, &[], vec![]);
        bar.urgent_tags = 0b100;
        bar.schemes.tag_normal.background = 9;
        let model = BarModel::build(&bar, 10, measure);
        assert_eq!(model.cells[1].scheme.foreground, 9);
        assert_eq!(model.cells[1].scheme.background, 4);
    }

    #[test]
    fn overview_shows_a_single_label() {
        let tags = tags();
        let mut bar = input(&tags, &[], vec![]);
        bar.is_overview = true;
        let model = BarModel::build(&bar, 10, measure);
        assert_eq!(model.cells[0].text, "OVERVIEW");
        assert_eq!(model.hit(5), BarHit::LayoutSymbol);
    }

    #[test]
    fn task_cells_are_capped_at_ten_spaces() {
        let tags = tags();
        let status = parse_status("x".repeat(30).as_str());
        let tasks = vec![
            TaskEntry {
                window: 10,
                title: "a very long window title indeed",
                state: TaskState::Selected,
            },
            TaskEntry {
                window: 11,
                title: "b",
                state: TaskState::Hidden,
            },
        ];
        let model = BarModel::build(&input(&tags, &status, tasks), 10, measure);

        assert_eq!(model.status_x, 700);
        assert_eq!(model.task_width(10), 110);
        assert_eq!(model.task_width(11), 20);
        assert_eq!(model.task_width(99), 0);

        let hidden = model.cells.iter().find(|c| c.region == Region::Task(11));
        assert_eq!(hidden.map(|c| c.scheme.foreground), Some(3));
    }

    #[test]
    fn overflowing_task_shows_an_ellipsis() {
        let tags = tags();
        let status = parse_status("x".repeat(85).as_str());
        let tasks = vec![
            TaskEntry {
                window: 10,
                title: "first",
                state: TaskState::Normal,
            },
            TaskEntry {
                window: 11,
                title: "second title",
                state: TaskState::Normal,
            },
        ];
        let model = BarModel::build(&input(&tags, &status, tasks), 10, measure);

        // status at 150, tasks start at 80, "first" takes 60, 10 px remain
        let cell = model.cells.iter().find(|c| c.region == Region::Task(11));
        assert_eq!(cell.map(|c| (c.text.as_str(), c.width)), Some(("...", 10)));
    }

    #[test]
    fn clicks_resolve_to_regions() {
        let tags = tags();
        let status = parse_status("^sclock^12:00");
        let tasks = vec![TaskEntry {
            window: 42,
            title: "term",
            state: TaskState::Selected,
        }];
        let model = BarModel::build(&input(&tags, &status, tasks), 10, measure);

        assert_eq!(model.hit(0), BarHit::Tag(0));
        assert_eq!(model.hit(25), BarHit::Tag(2));
        assert_eq!(model.hit(45), BarHit::LayoutSymbol);
        assert_eq!(model.hit(85), BarHit::Task(42));
        assert_eq!(model.hit(500), BarHit::Empty);
        assert_eq!(model.hit(960), BarHit::Status { offset: 10 });
    }
}

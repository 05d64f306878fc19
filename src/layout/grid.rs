use super::{Layout, LayoutParams, Rect};

const SOLO_WIDTH_RATIO: f64 = 0.7;
const SOLO_HEIGHT_RATIO: f64 = 0.65;

pub struct GridLayout;

impl Layout for GridLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Grid.as_str()
    }

    fn symbol(&self) -> &'static str {
        "[#]"
    }

    fn arrange(&self, client_count: usize, params: &LayoutParams) -> Vec<Rect> {
        arrange_grid(client_count, params, params.gaps.outer, params.gaps.inner)
    }
}

/// Grid arrangement shared by the grid layout and the overview.
///
/// One client is centred on the monitor at 70% x 65% of the gapped work
/// area, two clients sit side by side at 65% height, and three or more are
/// laid out in `cols x rows` cells with a short trailing row centred.
pub fn arrange_grid(client_count: usize, params: &LayoutParams, outer: i32, inner: i32) -> Vec<Rect> {
    let screen = params.screen;
    let area = params.work_area;

    match client_count {
        0 => Vec::new(),
        1 => {
            let width = ((area.width - 2 * outer) as f64 * SOLO_WIDTH_RATIO) as i32;
            let height = ((area.height - 2 * outer) as f64 * SOLO_HEIGHT_RATIO) as i32;
            vec![Rect::new(
                screen.x + (screen.width - width) / 2,
                screen.y + (screen.height - height) / 2,
                width,
                height,
            )]
        }
        2 => {
            let width = (area.width - 2 * outer - inner) / 2;
            let height = ((area.height - 2 * outer) as f64 * SOLO_HEIGHT_RATIO) as i32;
            let y = screen.y + (screen.height - height) / 2;
            vec![
                Rect::new(area.x + outer, y, width, height),
                Rect::new(area.x + outer + width + inner, y, width, height),
            ]
        }
        count => {
            let mut cols = 0;
            while cols * cols < count {
                cols += 1;
            }
            let rows = if (cols - 1) * cols >= count { cols - 1 } else { cols };

            let (cols_i32, rows_i32) = (cols as i32, rows as i32);
            let cell_height = (area.height - 2 * outer - (rows_i32 - 1) * inner) / rows_i32;
            let cell_width = (area.width - 2 * outer - (cols_i32 - 1) * inner) / cols_i32;

            let trailing = count % cols;
            let trailing_offset = if trailing > 0 {
                let trailing_i32 = trailing as i32;
                (area.width - trailing_i32 * cell_width - (trailing_i32 - 1) * inner) / 2 - outer
            } else {
                0
            };

            (0..count)
                .map(|index| {
                    let mut x = area.x + (index % cols) as i32 * (cell_width + inner);
                    let y = area.y + (index / cols) as i32 * (cell_height + inner);
                    if trailing > 0 && index >= count - trailing {
                        x += trailing_offset;
                    }
                    Rect::new(x + outer, y + outer, cell_width, cell_height)
                })
                .collect()
        }
    }
}

use super::{Layout, LayoutParams, Rect, split_column};

pub struct TilingLayout;

impl Layout for TilingLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Tiling.as_str()
    }

    fn symbol(&self) -> &'static str {
        "[]="
    }

    fn arrange(&self, client_count: usize, params: &LayoutParams) -> Vec<Rect> {
        if client_count == 0 {
            return Vec::new();
        }

        let area = params.work_area;
        let inner = params.gaps.inner;
        let outer = params.gaps.outer;
        let num_master = params.num_master.max(0) as usize;

        let master_width = if client_count > num_master {
            if num_master > 0 {
                ((area.width + inner) as f32 * params.master_factor) as i32
            } else {
                0
            }
        } else {
            area.width - 2 * outer + inner
        };

        let master_count = num_master.min(client_count);
        let stack_count = client_count - master_count;
        let column_height = area.height - 2 * outer;

        let mut geometries = split_column(
            area.x + outer,
            area.y + outer,
            master_width - inner,
            column_height,
            inner,
            master_count,
        );

        geometries.extend(split_column(
            area.x + master_width + outer,
            area.y + outer,
            area.width - master_width - 2 * outer,
            column_height,
            inner,
            stack_count,
        ));

        geometries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GapConfig;

    fn params(num_master: i32, master_factor: f32, gaps: i32) -> LayoutParams {
        let area = Rect::new(0, 0, 1000, 800);
        LayoutParams {
            screen: area,
            work_area: area,
            num_master,
            master_factor,
            gaps: GapConfig {
                inner: gaps,
                outer: gaps,
            },
        }
    }

    #[test]
    fn three_clients_one_master() {
        let geometries = TilingLayout.arrange(3, &params(1, 0.5, 0));
        assert_eq!(
            geometries,
            vec![
                Rect::new(0, 0, 500, 800),
                Rect::new(500, 0, 500, 400),
                Rect::new(500, 400, 500, 400),
            ]
        );
    }

    #[test]
    fn master_takes_fraction_when_stack_exists() {
        let geometries = TilingLayout.arrange(4, &params(2, 0.6, 0));
        assert_eq!(geometries[0].width, 600);
        assert_eq!(geometries[1].width, 600);
        assert_eq!(geometries[0].height + geometries[1].height, 800);
        assert_eq!(geometries[2].x, 600);
        assert_eq!(geometries[2].width, 400);
        assert_eq!(geometries[2].height + geometries[3].height, 800);
    }

    #[test]
    fn fewer_clients_than_master_slots_fill_the_width() {
        let geometries = TilingLayout.arrange(2, &params(3, 0.3, 0));
        assert_eq!(geometries.len(), 2);
        assert!(geometries.iter().all(|g| g.x == 0 && g.width == 1000));
        assert_eq!(geometries.iter().map(|g| g.height).sum::<i32>(), 800);
    }

    #[test]
    fn zero_master_slots_gives_everything_to_the_stack() {
        let geometries = TilingLayout.arrange(2, &params(0, 0.5, 0));
        assert!(geometries.iter().all(|g| g.x == 0 && g.width == 1000));
    }

    #[test]
    fn gaps_surround_and_separate_clients() {
        let geometries = TilingLayout.arrange(2, &params(1, 0.5, 10));
        // master width = (1000 + 10) * 0.5 = 505
        assert_eq!(geometries[0], Rect::new(10, 10, 495, 780));
        assert_eq!(geometries[1], Rect::new(515, 10, 475, 780));
        assert_eq!(geometries[1].x - (geometries[0].x + geometries[0].width), 10);
    }

    #[test]
    fn rerunning_yields_identical_output() {
        let p = params(1, 0.55, 12);
        assert_eq!(TilingLayout.arrange(5, &p), TilingLayout.arrange(5, &p));
    }
}

use super::{Layout, LayoutParams, Rect};

pub struct MonocleLayout;

impl Layout for MonocleLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Monocle.as_str()
    }

    fn symbol(&self) -> &'static str {
        "[M]"
    }

    fn arrange(&self, client_count: usize, params: &LayoutParams) -> Vec<Rect> {
        let area = params.work_area;
        let outer = params.gaps.outer;

        let geometry = Rect::new(
            area.x + outer,
            area.y + outer,
            area.width - 2 * outer,
            area.height - 2 * outer,
        );

        vec![geometry; client_count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GapConfig;

    #[test]
    fn every_client_gets_the_whole_work_area() {
        let area = Rect::new(0, 20, 1000, 780);
        let params = LayoutParams {
            screen: Rect::new(0, 0, 1000, 800),
            work_area: area,
            num_master: 1,
            master_factor: 0.5,
            gaps: GapConfig { inner: 4, outer: 5 },
        };
        let geometries = MonocleLayout.arrange(3, &params);
        assert_eq!(geometries, vec![Rect::new(5, 25, 990, 770); 3]);
    }
}

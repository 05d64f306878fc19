use super::grid::arrange_grid;
use super::{GapConfig, Layout, LayoutParams, Rect};

/// Grid over every client on the monitor, with its own fixed gaps.
pub struct OverviewLayout {
    pub gaps: GapConfig,
}

impl Layout for OverviewLayout {
    fn name(&self) -> &'static str {
        "overview"
    }

    fn symbol(&self) -> &'static str {
        "[O]"
    }

    fn arrange(&self, client_count: usize, params: &LayoutParams) -> Vec<Rect> {
        arrange_grid(client_count, params, self.gaps.outer, self.gaps.inner)
    }
}

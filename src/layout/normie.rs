use super::{Layout, LayoutParams, Rect};

pub struct NormieLayout;

// No-op arrangement: every client keeps the geometry it already has.
impl Layout for NormieLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Normie.as_str()
    }

    fn symbol(&self) -> &'static str {
        "><>"
    }

    fn arrange(&self, _client_count: usize, _params: &LayoutParams) -> Vec<Rect> {
        Vec::new()
    }
}

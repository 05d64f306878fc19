pub mod grid;
pub mod monocle;
pub mod normie;
pub mod overview;
pub mod tiling;

pub type LayoutBox = Box<dyn Layout>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Area of the overlap between `self` and `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let width = (self.x + self.width).min(other.x + other.width) - self.x.max(other.x);
        let height = (self.y + self.height).min(other.y + other.height) - self.y.max(other.y);
        i64::from(width.max(0)) * i64::from(height.max(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapConfig {
    pub inner: i32,
    pub outer: i32,
}

/// Everything an arrangement depends on besides the number of clients.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    /// Full monitor rectangle.
    pub screen: Rect,
    /// Monitor rectangle minus the bar.
    pub work_area: Rect,
    pub num_master: i32,
    pub master_factor: f32,
    pub gaps: GapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutType {
    Tiling,
    Grid,
    Monocle,
    Normie,
}

impl LayoutType {
    pub fn new(&self) -> LayoutBox {
        match self {
            Self::Tiling => Box::new(tiling::TilingLayout),
            Self::Grid => Box::new(grid::GridLayout),
            Self::Monocle => Box::new(monocle::MonocleLayout),
            Self::Normie => Box::new(normie::NormieLayout),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Tiling => Self::Grid,
            Self::Grid => Self::Monocle,
            Self::Monocle => Self::Normie,
            Self::Normie => Self::Tiling,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiling => "tiling",
            Self::Grid => "grid",
            Self::Monocle => "monocle",
            Self::Normie => "normie",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "tiling" | "tile" => Ok(Self::Tiling),
            "grid" | "magicgrid" => Ok(Self::Grid),
            "monocle" => Ok(Self::Monocle),
            "normie" | "floating" => Ok(Self::Normie),
            _ => Err(format!("Invalid Layout Type: {}", s)),
        }
    }
}

/// A pure arrangement: the same client count and parameters always produce
/// the same rectangles. Returned rectangles include the client border.
pub trait Layout {
    fn arrange(&self, client_count: usize, params: &LayoutParams) -> Vec<Rect>;
    fn name(&self) -> &'static str;
    fn symbol(&self) -> &'static str;
}

/// Splits a column into `count` cells separated by `gap`. The last cell
/// absorbs the division remainder so the cells always fill `height`.
pub(crate) fn split_column(x: i32, y: i32, width: i32, height: i32, gap: i32, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let count_i32 = count as i32;
    let usable = height - gap * (count_i32 - 1);
    let cell_height = usable / count_i32;

    (0..count_i32)
        .map(|index| {
            let cell_y = y + index * (cell_height + gap);
            let height = if index == count_i32 - 1 {
                usable - cell_height * (count_i32 - 1)
            } else {
                cell_height
            };
            Rect::new(x, cell_y, width, height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_column_fills_height_exactly() {
        let cells = split_column(0, 0, 100, 801, 0, 2);
        assert_eq!(cells[0], Rect::new(0, 0, 100, 400));
        assert_eq!(cells[1], Rect::new(0, 400, 100, 401));
        assert_eq!(cells.iter().map(|c| c.height).sum::<i32>(), 801);
    }

    #[test]
    fn split_column_respects_gaps() {
        let cells = split_column(10, 10, 100, 210, 10, 2);
        assert_eq!(cells[0], Rect::new(10, 10, 100, 100));
        assert_eq!(cells[1], Rect::new(10, 120, 100, 100));
    }

    #[test]
    fn intersection_area_of_disjoint_rects_is_zero() {
        let left = Rect::new(0, 0, 100, 100);
        let right = Rect::new(100, 0, 100, 100);
        assert_eq!(left.intersection_area(&right), 0);
        assert_eq!(left.intersection_area(&Rect::new(50, 50, 100, 100)), 2500);
    }

    #[test]
    fn layout_names_round_trip() {
        for layout in [LayoutType::Tiling, LayoutType::Grid, LayoutType::Monocle, LayoutType::Normie] {
            assert_eq!(LayoutType::from_str(layout.as_str()), Ok(layout));
        }
        assert!(LayoutType::from_str("spiral").is_err());
    }
}

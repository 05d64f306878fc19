//! `WM_NORMAL_HINTS` decoding.

pub mod flags {
    pub const P_MIN_SIZE: u32 = 1 << 4;
    pub const P_MAX_SIZE: u32 = 1 << 5;
    pub const P_RESIZE_INC: u32 = 1 << 6;
    pub const P_ASPECT: u32 = 1 << 7;
    pub const P_BASE_SIZE: u32 = 1 << 8;
}

pub mod offset {
    pub const FLAGS: usize = 0;
    pub const MIN_WIDTH: usize = 5;
    pub const MIN_HEIGHT: usize = 6;
    pub const MAX_WIDTH: usize = 7;
    pub const MAX_HEIGHT: usize = 8;
    pub const WIDTH_INC: usize = 9;
    pub const HEIGHT_INC: usize = 10;
    pub const MIN_ASPECT_X: usize = 11;
    pub const MIN_ASPECT_Y: usize = 12;
    pub const MAX_ASPECT_X: usize = 13;
    pub const MAX_ASPECT_Y: usize = 14;
    pub const BASE_WIDTH: usize = 15;
    pub const BASE_HEIGHT: usize = 16;
}

/// Size constraints a client asked for. A missing property decodes to all
/// zeroes, which means "unconstrained".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub increment_width: i32,
    pub increment_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl SizeHints {
    /// Decodes the raw 32-bit words of a `WM_NORMAL_HINTS` property.
    /// Base and minimum sizes stand in for each other when only one is set.
    pub fn from_raw(values: &[u32]) -> Self {
        let field = |index: usize| values.get(index).copied().unwrap_or(0) as i32;
        let flag_bits = values.get(offset::FLAGS).copied().unwrap_or(0);
        let has = |flag: u32| flag_bits & flag != 0;

        let mut hints = Self::default();

        if has(flags::P_BASE_SIZE) {
            hints.base_width = field(offset::BASE_WIDTH);
            hints.base_height = field(offset::BASE_HEIGHT);
        } else if has(flags::P_MIN_SIZE) {
            hints.base_width = field(offset::MIN_WIDTH);
            hints.base_height = field(offset::MIN_HEIGHT);
        }

        if has(flags::P_RESIZE_INC) {
            hints.increment_width = field(offset::WIDTH_INC);
            hints.increment_height = field(offset::HEIGHT_INC);
        }

        if has(flags::P_MAX_SIZE) {
            hints.max_width = field(offset::MAX_WIDTH);
            hints.max_height = field(offset::MAX_HEIGHT);
        }

        if has(flags::P_MIN_SIZE) {
            hints.min_width = field(offset::MIN_WIDTH);
            hints.min_height = field(offset::MIN_HEIGHT);
        } else if has(flags::P_BASE_SIZE) {
            hints.min_width = field(offset::BASE_WIDTH);
            hints.min_height = field(offset::BASE_HEIGHT);
        }

        if has(flags::P_ASPECT) {
            let (min_x, min_y) = (field(offset::MIN_ASPECT_X), field(offset::MIN_ASPECT_Y));
            let (max_x, max_y) = (field(offset::MAX_ASPECT_X), field(offset::MAX_ASPECT_Y));
            if min_x != 0 && max_y != 0 {
                hints.min_aspect = min_y as f32 / min_x as f32;
                hints.max_aspect = max_x as f32 / max_y as f32;
            }
        }

        hints
    }

    pub fn is_fixed(&self) -> bool {
        self.max_width != 0
            && self.max_height != 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_hints(flag_bits: u32, assign: &[(usize, u32)]) -> Vec<u32> {
        let mut values = vec![0u32; 18];
        values[offset::FLAGS] = flag_bits;
        for &(index, value) in assign {
            values[index] = value;
        }
        values
    }

    #[test]
    fn missing_property_is_unconstrained() {
        let hints = SizeHints::from_raw(&[]);
        assert_eq!(hints, SizeHints::default());
        assert!(!hints.is_fixed());
    }

    #[test]
    fn min_size_doubles_as_base_size() {
        let values = raw_hints(
            flags::P_MIN_SIZE,
            &[(offset::MIN_WIDTH, 100), (offset::MIN_HEIGHT, 50)],
        );
        let hints = SizeHints::from_raw(&values);
        assert_eq!((hints.base_width, hints.base_height), (100, 50));
        assert_eq!((hints.min_width, hints.min_height), (100, 50));
    }

    #[test]
    fn equal_min_and_max_means_fixed() {
        let values = raw_hints(
            flags::P_MIN_SIZE | flags::P_MAX_SIZE,
            &[
                (offset::MIN_WIDTH, 300),
                (offset::MIN_HEIGHT, 200),
                (offset::MAX_WIDTH, 300),
                (offset::MAX_HEIGHT, 200),
            ],
        );
        assert!(SizeHints::from_raw(&values).is_fixed());
    }

    #[test]
    fn aspect_ratios_are_inverted_for_the_minimum() {
        let values = raw_hints(
            flags::P_ASPECT,
            &[
                (offset::MIN_ASPECT_X, 4),
                (offset::MIN_ASPECT_Y, 3),
                (offset::MAX_ASPECT_X, 16),
                (offset::MAX_ASPECT_Y, 9),
            ],
        );
        let hints = SizeHints::from_raw(&values);
        assert!((hints.min_aspect - 0.75).abs() < f32::EPSILON);
        assert!((hints.max_aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}

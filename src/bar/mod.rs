pub mod model;
pub mod status;

pub use model::{BarCell, BarHit, BarInput, BarModel, BarSchemes, Region, TaskEntry, TaskState};
pub use status::{StatusRun, hit_test, parse_status};

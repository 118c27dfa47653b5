pub mod controls;
pub mod hit;

pub use controls::{ControlKind, ControlVisibility, ControlWithProps, visible_controls};
pub use hit::{hit_test, hit_test_all, hit_test_rect};

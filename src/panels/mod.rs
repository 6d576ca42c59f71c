//! egui panels over the [`Studio`](crate::studio::Studio).
//!
//! Panels never hold a borrow of a component across a Studio call: every
//! call may publish events that borrow those components again.

mod canvas_panel;
mod files_panel;
mod layers_panel;
mod side_panel;
mod status_panel;

pub use canvas_panel::canvas_panel;
pub use files_panel::files_panel;
pub use layers_panel::layers_panel;
pub use side_panel::side_panel;
pub use status_panel::{error_window, status_bar};

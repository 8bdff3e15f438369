pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use utils::{
  centered_rect, column, draw_input_overlay, draw_input_overlay_with_rows, draw_message, truncate,
};

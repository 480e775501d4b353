//! Rendering helpers shared by the widgets.
//!
//! - **renderer**: Erase-then-redraw of multi-line output, width measurement
//! - **paginate**: Page window over long option lists
//! - **filter**: Pluggable option filters
//! - **editor**: Single-line edit buffer
//! - **style**: Colour specs and their cache

pub mod editor;
pub mod filter;
pub mod paginate;
pub mod renderer;
pub mod style;

pub use editor::{Edit, LineEditor};
pub use filter::{default_filter, visible_indices, Filter};
pub use paginate::paginate;
pub use renderer::{physical_rows, visible_width, LineRenderer};
pub use style::StyleCache;

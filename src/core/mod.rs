//! Low-level terminal access.
//!
//! ```text
//! Terminal
//! ├── ModeController (raw mode acquire/restore)
//! └── TermIo
//!     ├── RuneReader (bytes -> KeyEvent)
//!     └── output + Cursor (movement, erase, position query)
//! ```

pub mod term;

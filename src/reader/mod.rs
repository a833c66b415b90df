//! Magazine reader state.
//!
//! [`MagazineReader`] owns the current page of an open issue. Keys, swipes and
//! contents jumps all end up in [`MagazineReader::go_to_page`], which is the
//! only place the page index changes.

pub mod gesture;
pub mod position;
pub mod state;

pub use gesture::{Swipe, SwipeConfig, SwipeTracker};
pub use position::ReadingPositions;
pub use state::{Direction, MagazineReader, Phase, ReaderAction};

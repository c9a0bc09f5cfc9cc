//! Map surface integration.
//!
//! - `surface` - The `MapSurface` seam the handler drives
//! - `listeners` - One subscription per armed event type, fanned out to the
//!   active interaction's handlers

mod listeners;
mod surface;

pub use surface::{MapListener, MapSurface};

//! PLC process image: symbol tables per controller and conversion between
//! named bits and the policy's structured snapshots.

pub mod image;
pub mod map;

pub use image::IoImage;
pub use map::{Contact, Direction, IoMap, IoPoint, sym};

//! The drawn-contour core: geometry mappers, the stroke recorder, and the
//! compiler that turns an ordered point sequence into timed playback events.

pub mod mapper;
pub mod path;
pub mod persistence;
pub mod schedule;

#![forbid(unsafe_code)]

pub mod answers;
pub mod model;
pub mod navigation;
pub mod phase;
pub mod session;
pub mod submission;
pub mod time;
pub mod timer;

pub use time::Clock;

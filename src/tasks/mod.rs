//! Background Tasks Module
//!
//! # Tasks
//! - Reaper: purges expired in-process cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_reaper_task;

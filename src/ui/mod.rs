//! User-facing front ends driving the sync controller.

pub mod console;

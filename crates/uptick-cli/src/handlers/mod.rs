//! Command handlers.
//!
//! Each handler parses CLI-specific input, calls one core service and
//! formats the result for the terminal. No business logic lives here.

pub mod assess;
pub mod check;
pub mod serve;
pub mod speak;

//! jobscroll - harvest job listings from infinitely scrolling search results.
//!
//! Drives a browser through a keyword job search, then scrolls the results
//! list step by step, appending every newly rendered listing to a JSON file
//! exactly once.

pub mod config;
pub mod driver;
pub mod harvest;
pub mod models;
pub mod session;

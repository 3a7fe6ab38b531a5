//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Policies are cached per origin for the process lifetime; fetch failures fail open.

mod cache;
mod parser;

pub use cache::{fetch_robots, RobotsCache};
pub use parser::{robots_token, ParsedRobots};

//! API Routes
//!
//! Route handlers organized by functionality.

pub mod entries;
pub mod graph;
pub mod health;
pub mod migrations;

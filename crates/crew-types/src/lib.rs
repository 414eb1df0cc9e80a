//! Common types module for the crew staffing system.
//!
//! This module defines the core data types and structures used throughout
//! the staffing system. It provides a centralized location for shared types
//! to ensure consistency across all staffing components.

/// Actor and role types for callers of the engine.
pub mod actor;
/// Application types for workers responding to orders.
pub mod application;
/// Assignment types for confirmed work on an order.
pub mod assignment;
/// Command surface exposed to the presentation layer.
pub mod command;
/// Order types including drafts, schedules, and statuses.
pub mod order;
/// Joined order snapshot types consumed by guards and views.
pub mod view;

// Re-export all types for convenient access
pub use actor::*;
pub use application::*;
pub use assignment::*;
pub use command::*;
pub use order::*;
pub use view::*;

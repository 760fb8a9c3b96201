//! Statistics are always derived from the last fetched movie list.
//! They are never stored and never fed back into records.

pub mod entity;
pub use entity::{display_name, initials, DashboardStats, ProfileSummary, RECENT_ACTIVITY_LIMIT};

// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands accept DTOs, return DTOs
// - Commands convert errors into strings for the UI boundary
// - Commands NEVER contain business logic

pub mod auth_commands;
pub mod movie_commands;
pub mod navigation_commands;
pub mod search_commands;

pub use auth_commands::*;
pub use movie_commands::*;
pub use navigation_commands::*;
pub use search_commands::*;

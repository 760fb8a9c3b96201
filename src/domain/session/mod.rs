pub mod entity;

pub use entity::{AuthChangeEvent, Session, User, UserMetadata};

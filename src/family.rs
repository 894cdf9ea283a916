//! Structured family record and its merge engine

mod filter;
mod model;
mod store;

#[cfg(test)]
mod proptests;

pub use filter::{from_value, CATEGORIES};
pub use model::{Dynamic, Event, FamilyData, FamilyMember, Relationship};
pub use store::EntityStore;

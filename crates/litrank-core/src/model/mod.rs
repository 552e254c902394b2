//! Domain model for litrank.
//!
//! - [`Entity`] - a research artifact (method, paper, benchmark, ...)
//! - [`EntityRelationship`] - a typed edge between two entity ids
//! - [`BenchmarkScore`] - a method's score on one benchmark metric
//! - [`EntityType`] / [`RelationType`] - the closed kind enumerations

pub mod entities;
pub mod kinds;
pub mod timestamp;

pub use entities::{Attributes, BenchmarkScore, Entity, EntityRelationship};
pub use kinds::{EntityType, RelationType};

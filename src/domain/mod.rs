//! Domain layer: entities, repository traits, and the analytics worker.

pub mod access_worker;
pub mod entities;
pub mod repositories;

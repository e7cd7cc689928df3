//! Application services orchestrating the domain.

pub mod code_generator;
pub mod guard_service;
pub mod resolver_service;
pub mod stats_service;

pub use code_generator::CodeGenerator;
pub use guard_service::{GuardConfig, RateGuard};
pub use resolver_service::ResolverService;
pub use stats_service::StatsService;

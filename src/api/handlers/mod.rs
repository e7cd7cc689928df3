//! HTTP request handlers.

mod delete;
mod health;
mod redirect;
mod shorten;
mod stats;

pub use delete::delete_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::stats_handler;

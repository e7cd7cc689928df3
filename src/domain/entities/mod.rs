//! Core business entities.

mod access_event;
mod url_record;

pub use access_event::AccessEvent;
pub use url_record::{NewUrlRecord, RecordStatus, UrlRecord, UrlStats};

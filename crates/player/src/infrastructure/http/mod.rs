//! HTTP adapters.

mod record_store_client;

pub use record_store_client::{HttpRecordStore, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};

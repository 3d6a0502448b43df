pub mod sqlite;

pub use sqlite::{ReviewRecord, ReviewStore, StoreError};

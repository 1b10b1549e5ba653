mod mirror;
mod seed;
mod storage;
mod store;

pub use mirror::{HttpMirror, Mirror, MirrorOutcome};
pub use seed::seed_questions;
pub use storage::{LocalStorage, StorageError, DEFAULT_STORE_PATH};
pub use store::{QuestionStore, StoreError};

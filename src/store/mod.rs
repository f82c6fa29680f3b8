mod sqlite;

pub use sqlite::{PromptStore, StoreError};

pub mod dictionary;
pub mod jobs;
pub mod local;

pub use dictionary::FileDictionaryStore;
pub use jobs::FileJobStore;
pub use local::LocalStorage;

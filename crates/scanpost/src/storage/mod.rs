pub mod filesystem;

pub use filesystem::{
    Destination, FileStorage, FAILED_DIR, FINISHED_DIR, LOGS_DIR, RESERVED_DIRECTORIES,
};

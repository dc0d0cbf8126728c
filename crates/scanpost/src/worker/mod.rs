pub mod job;
pub mod scanner;

pub use job::{FileOutcome, FileRecord};
pub use scanner::DirectoryScanner;

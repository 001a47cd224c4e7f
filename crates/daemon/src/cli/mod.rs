pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Admin, Bucket, Daemon, Entry, Init, Version};

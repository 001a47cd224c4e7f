pub mod admin;
pub mod bucket;
pub mod daemon;
pub mod entry;
pub mod init;
pub mod version;

pub use admin::Admin;
pub use bucket::Bucket;
pub use daemon::Daemon;
pub use entry::Entry;
pub use init::Init;
pub use version::Version;

pub mod archive;
pub mod local;
pub mod metadata;
pub mod remote;

pub use archive::{ArchiveResolver, ArchiveSettings, ArchiveRepository};
pub use local::LocalResolver;
pub use remote::{RemoteResolver, RemoteSettings, Repository};

mod colors;
mod fs;
mod hash;
mod misc;
mod pretty;

pub use colors::DataType;
pub use fs::{write_atomic, write_atomic_with};
pub use hash::Sha256;
pub use misc::OkMissing;
pub use pretty::Unit;

pub trait ToHumanString {
    fn to_print_string(&self) -> String;
}

impl ToHumanString for std::path::Path {
    fn to_print_string(&self) -> String {
        DataType::Path.colorize(&self.to_string_lossy())
    }
}

impl ToHumanString for std::path::PathBuf {
    fn to_print_string(&self) -> String {
        self.as_path().to_print_string()
    }
}

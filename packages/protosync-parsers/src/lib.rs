mod error;
mod lexer;
mod proto;

pub use error::Error;
pub use lexer::Position;
pub use proto::{parse, Entry, ImportModifier, ProtoFile, Statement};

use std::borrow::Cow;

pub(crate) mod zip_structs;

pub mod error;
pub mod zip;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Stored,
    Deflate(u32),
}

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub name: String,
    pub mode: u32,
    pub crc: u32,
    pub data: Cow<'a, [u8]>,
}

impl<'a> Entry<'a> {
    pub fn new<N: Into<String>, D: Into<Cow<'a, [u8]>>>(name: N, data: D) -> Self {
        let data = data.into();

        Entry {
            name: name.into(),
            mode: 0o644,
            crc: crc32fast::hash(&data),
            data,
        }
    }

    pub fn into_owned(self) -> Entry<'static> {
        Entry {
            name: self.name,
            mode: self.mode,
            crc: self.crc,
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

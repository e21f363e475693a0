use std::{borrow::Cow, collections::BTreeMap, io::{Read, Write}};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression as FlateCompression};
use zerocopy::{byteorder::little_endian::{U16, U32}, FromBytes, IntoBytes};

use crate::{
    error::Error,
    zip_structs::{CentralDirectoryRecord, EndOfCentralDirectoryRecord, FileHeader, GeneralRecord, CENTRAL_DIRECTORY_SIGNATURE, END_OF_CENTRAL_DIRECTORY_SIGNATURE, GENERAL_RECORD_SIGNATURE},
    CompressionAlgorithm,
    Entry,
};

#[cfg(test)]
#[path = "./zip.test.rs"]
mod tests;

const STORED: u16 = 0;
const DEFLATE: u16 = 8;

#[derive(Debug, Clone)]
struct EntryLocation {
    local_header_offset: usize,
    compressed_size: usize,
    compression_method: u16,
    crc: u32,
    mode: u32,
}

/// A zip (or jar) file held in memory, indexed by entry name so that
/// individual files can be extracted without walking the whole archive.
#[derive(Debug)]
pub struct ZipArchive {
    buffer: Vec<u8>,
    entries: BTreeMap<String, EntryLocation>,
}

impl ZipArchive {
    pub fn new(buffer: Vec<u8>) -> Result<ZipArchive, Error> {
        let end_of_central_directory_offset
            = find_end_of_central_directory(&buffer)?;

        let (end_of_central_directory, _) = EndOfCentralDirectoryRecord::ref_from_prefix(&buffer[end_of_central_directory_offset..])
            .map_err(|_| Error::InvalidZipFile("Truncated end of central directory record".to_string()))?;

        let number_of_files
            = end_of_central_directory.number_of_files.get() as usize;

        let mut offset
            = end_of_central_directory.offset_of_central_directory.get() as usize;

        let mut entries
            = BTreeMap::new();

        for _ in 0..number_of_files {
            let record_data = buffer.get(offset..)
                .ok_or_else(|| Error::InvalidZipFile("Central directory out of bounds".to_string()))?;

            let (record, rest) = CentralDirectoryRecord::ref_from_prefix(record_data)
                .map_err(|_| Error::InvalidZipFile("Truncated central directory record".to_string()))?;

            if record.signature != CENTRAL_DIRECTORY_SIGNATURE {
                return Err(Error::InvalidZipFile(format!("Invalid central directory signature at offset {}", offset)));
            }

            let name_length
                = record.header.file_name_length.get() as usize;

            let name_data = rest.get(..name_length)
                .ok_or_else(|| Error::InvalidZipFile("Truncated file name".to_string()))?;

            let name
                = std::str::from_utf8(name_data)?.to_string();

            entries.insert(name, EntryLocation {
                local_header_offset: record.relative_offset_of_local_header.get() as usize,
                compressed_size: record.header.compressed_size.get() as usize,
                compression_method: record.header.compression_method.get(),
                crc: record.header.crc_32.get(),
                mode: record.external_file_attributes.get() >> 16,
            });

            offset += std::mem::size_of::<CentralDirectoryRecord>()
                + name_length
                + record.header.extra_field_length.get() as usize
                + record.file_comment_length.get() as usize;
        }

        Ok(ZipArchive {
            buffer,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|name| name.as_str())
    }

    /// Extracts the entry whose name is exactly `name` (case-sensitive).
    pub fn read(&self, name: &str) -> Result<Option<Entry<'_>>, Error> {
        let Some(location) = self.entries.get(name) else {
            return Ok(None);
        };

        let record_data = self.buffer.get(location.local_header_offset..)
            .ok_or_else(|| Error::InvalidZipFile(format!("Local header out of bounds for {}", name)))?;

        let (general_record, _) = GeneralRecord::ref_from_prefix(record_data)
            .map_err(|_| Error::InvalidZipFile(format!("Truncated local header for {}", name)))?;

        if general_record.signature != GENERAL_RECORD_SIGNATURE {
            return Err(Error::InvalidZipFile(format!("Invalid local header signature for {}", name)));
        }

        let data_offset = location.local_header_offset
            + std::mem::size_of::<GeneralRecord>()
            + general_record.header.file_name_length.get() as usize
            + general_record.header.extra_field_length.get() as usize;

        let raw_data = self.buffer.get(data_offset..data_offset + location.compressed_size)
            .ok_or_else(|| Error::InvalidZipFile(format!("Data out of bounds for {}", name)))?;

        let data = match location.compression_method {
            STORED => Cow::Borrowed(raw_data),
            DEFLATE => Cow::Owned(unpack_deflate(raw_data)?),

            method => return Err(Error::UnsupportedCompression {
                name: name.to_string(),
                method,
            }),
        };

        if crc32fast::hash(&data) != location.crc {
            return Err(Error::ChecksumMismatch(name.to_string()));
        }

        Ok(Some(Entry {
            name: name.to_string(),
            mode: location.mode,
            crc: location.crc,
            data,
        }))
    }
}

fn find_end_of_central_directory(buffer: &[u8]) -> Result<usize, Error> {
    let record_size
        = std::mem::size_of::<EndOfCentralDirectoryRecord>();

    if record_size > buffer.len() {
        return Err(Error::InvalidZipFile("Too small to contain the end of central directory record".to_string()));
    }

    // The record is followed by a variable-length comment of at most 64KiB
    let last_candidate
        = buffer.len() - record_size;
    let first_candidate
        = last_candidate.saturating_sub(u16::MAX as usize);

    (first_candidate..=last_candidate)
        .rev()
        .find(|offset| buffer[*offset..*offset + 4] == END_OF_CENTRAL_DIRECTORY_SIGNATURE)
        .ok_or_else(|| Error::InvalidZipFile("Missing end of central directory record".to_string()))
}

fn unpack_deflate(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder
        = DeflateDecoder::new(data);

    let mut buffer
        = Vec::new();

    decoder.read_to_end(&mut buffer)?;

    Ok(buffer)
}

fn pack_deflate(data: &[u8], level: u32) -> Result<Vec<u8>, Error> {
    let mut encoder
        = DeflateEncoder::new(Vec::new(), FlateCompression::new(level));

    encoder.write_all(data)?;

    Ok(encoder.finish()?)
}

pub fn craft_zip(entries: &[Entry], compression: CompressionAlgorithm) -> Result<Vec<u8>, Error> {
    let mut general_segment = Vec::new();
    let mut central_directory_segment = Vec::new();

    for entry in entries {
        let offset = general_segment.len();

        let (compression_method, data) = match compression {
            CompressionAlgorithm::Stored => (STORED, Cow::Borrowed(entry.data.as_ref())),
            CompressionAlgorithm::Deflate(level) => (DEFLATE, Cow::Owned(pack_deflate(&entry.data, level)?)),
        };

        let header = || FileHeader {
            version_needed_to_extract: U16::new(0x14),
            general_purpose_bit_flag: U16::new(0x00),
            compression_method: U16::new(compression_method),
            last_mod_file_time: U16::new(0xae40),
            last_mod_file_date: U16::new(0x08d6),
            crc_32: U32::new(entry.crc),
            compressed_size: U32::new(data.len() as u32),
            uncompressed_size: U32::new(entry.data.len() as u32),
            file_name_length: U16::new(entry.name.len() as u16),
            extra_field_length: U16::new(0x00),
        };

        general_segment.extend_from_slice(GeneralRecord {
            signature: GENERAL_RECORD_SIGNATURE,
            header: header(),
        }.as_bytes());

        general_segment.extend_from_slice(entry.name.as_bytes());
        general_segment.extend_from_slice(&data);

        central_directory_segment.extend_from_slice(CentralDirectoryRecord {
            signature: CENTRAL_DIRECTORY_SIGNATURE,
            version_made_by: U16::new(0x0314), // UNIX
            header: header(),
            file_comment_length: U16::new(0x00),
            disk_number_start: U16::new(0x00),
            internal_file_attributes: U16::new(0x00),
            external_file_attributes: U32::new(entry.mode << 16),
            relative_offset_of_local_header: U32::new(offset as u32),
        }.as_bytes());

        central_directory_segment.extend_from_slice(entry.name.as_bytes());
    }

    let end_of_central_directory = EndOfCentralDirectoryRecord {
        signature: END_OF_CENTRAL_DIRECTORY_SIGNATURE,
        disk_number: U16::new(0x00),
        disk_with_central_directory: U16::new(0x00),
        number_of_files_on_this_disk: U16::new(entries.len() as u16),
        number_of_files: U16::new(entries.len() as u16),
        size_of_central_directory: U32::new(central_directory_segment.len() as u32),
        offset_of_central_directory: U32::new(general_segment.len() as u32),
        comment_length: U16::new(0x00),
    };

    Ok([general_segment, central_directory_segment, end_of_central_directory.as_bytes().to_vec()].concat())
}

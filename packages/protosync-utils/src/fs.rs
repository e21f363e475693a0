use std::{io::Write, path::Path};

/// Writes `data` next to `path` in a temporary file, then renames it into
/// place. Readers of `path` either see the previous content or the complete
/// new one, never a partial write.
pub fn write_atomic<T: AsRef<[u8]>>(path: &Path, data: T) -> Result<(), std::io::Error> {
    write_atomic_with(path, |file| file.write_all(data.as_ref()))
}

pub fn write_atomic_with<F>(path: &Path, f: F) -> Result<(), std::io::Error>
where
    F: FnOnce(&mut std::fs::File) -> Result<(), std::io::Error>,
{
    let parent = path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut temp_file
        = tempfile::NamedTempFile::new_in(parent)?;

    f(temp_file.as_file_mut())?;

    temp_file.as_file_mut().flush()?;
    temp_file.persist(path)
        .map_err(|err| err.error)?;

    Ok(())
}

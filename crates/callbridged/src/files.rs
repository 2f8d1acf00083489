use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

/// Writes the provided bytes to the path using an atomic persist step.
///
/// The temporary file is created beside the target with a `.tmp` suffix, so
/// pollers that skip `*.tmp` names never observe a partial payload.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("callbridge"),
    );
    builder.suffix(".tmp");

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

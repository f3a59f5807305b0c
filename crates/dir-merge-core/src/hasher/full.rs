use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const CHUNK_SIZE: usize = 8192; // 8KB

/// Stream `file` through BLAKE3 in [`CHUNK_SIZE`] reads.
pub fn hash_file(file: &Path) -> io::Result<blake3::Hash> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = match f.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hasher.finalize())
}

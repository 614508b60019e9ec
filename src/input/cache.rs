use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::input::InputError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    if is_gzip(path)? {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn is_gzip(path: &Path) -> Result<bool, InputError> {
    if path.extension().is_some_and(|ext| ext == "gz") {
        return Ok(true);
    }
    let mut head = [0u8; 2];
    let mut file = File::open(path)?;
    let n = file.read(&mut head)?;
    Ok(n == 2 && head == GZIP_MAGIC)
}

/// Content fingerprint of a source file: FNV-1a over the bytes, mixed with the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub hash: u64,
    pub len: u64,
}

pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, InputError> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 8192];
    let mut hasher = Fnv64::new();
    let mut len = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        len += n as u64;
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint {
        hash: hasher.finish(),
        len,
    })
}

struct Fnv64 {
    hash: u64,
}

impl Fnv64 {
    fn new() -> Self {
        Self {
            hash: 0xcbf29ce484222325,
        }
    }

    fn update(&mut self, data: &[u8]) {
        let mut h = self.hash;
        for &b in data {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.hash = h;
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

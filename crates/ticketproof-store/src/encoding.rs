//! Blob encoding for upload.
//!
//! A blob is split into fixed-size chunks. Each chunk is hashed with Blake3
//! and the blob root is the Blake3 hash of the size and all chunk digests:
//!
//! ```text
//! root = blake3(size_le_u64 || digest_0 || digest_1 || ...)
//! ```
//!
//! The content reference of a blob is the base64url (unpadded) root, so two
//! uploads of the same bytes with the same chunk size share a reference.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use ticketproof_core::BlobId;

use crate::error::StoreError;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A blob split into digest-addressed chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlob {
    size: u64,
    chunks: Vec<Bytes>,
    digests: Vec<[u8; 32]>,
    root: [u8; 32],
}

impl EncodedBlob {
    /// Encode bytes with the given chunk size.
    ///
    /// A zero chunk size is treated as [`DEFAULT_CHUNK_SIZE`].
    pub fn encode(data: &[u8], chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let data = Bytes::copy_from_slice(data);
        let mut chunks = Vec::with_capacity(data.len().div_ceil(chunk_size));
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + chunk_size).min(data.len());
            chunks.push(data.slice(offset..end));
            offset = end;
        }

        let digests: Vec<[u8; 32]> = chunks.iter().map(|c| *blake3::hash(c).as_bytes()).collect();
        let size = data.len() as u64;
        let root = compute_root(size, &digests);

        Self {
            size,
            chunks,
            digests,
            root,
        }
    }

    /// Unencoded size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The chunks, in order.
    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    /// The blob root.
    pub fn root(&self) -> &[u8; 32] {
        &self.root
    }

    /// The content reference derived from the root.
    pub fn content_id(&self) -> BlobId {
        BlobId::new(URL_SAFE_NO_PAD.encode(self.root))
    }

    /// Check every chunk against its digest and the root against the digests.
    pub fn verify(&self) -> Result<(), StoreError> {
        if self.chunks.len() != self.digests.len() {
            return Err(StoreError::InvalidData(format!(
                "{} chunks but {} digests",
                self.chunks.len(),
                self.digests.len()
            )));
        }

        let total: u64 = self.chunks.iter().map(|c| c.len() as u64).sum();
        if total != self.size {
            return Err(StoreError::SizeMismatch {
                registered: self.size,
                uploaded: total,
            });
        }

        for (i, (chunk, digest)) in self.chunks.iter().zip(&self.digests).enumerate() {
            if blake3::hash(chunk).as_bytes() != digest {
                return Err(StoreError::InvalidData(format!("chunk {i} digest mismatch")));
            }
        }

        if compute_root(self.size, &self.digests) != self.root {
            return Err(StoreError::InvalidData("root mismatch".into()));
        }

        Ok(())
    }

    /// Reassemble the original bytes.
    pub fn reassemble(&self) -> Bytes {
        match self.chunks.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            many => {
                let mut buf = Vec::with_capacity(self.size as usize);
                for chunk in many {
                    buf.extend_from_slice(chunk);
                }
                Bytes::from(buf)
            }
        }
    }
}

fn compute_root(size: u64, digests: &[[u8; 32]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&size.to_le_bytes());
    for digest in digests {
        hasher.update(digest);
    }
    *hasher.finalize().as_bytes()
}

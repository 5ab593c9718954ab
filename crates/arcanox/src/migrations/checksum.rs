//! Checksum calculation for migration files
//!
//! Checksums are only used for drift detection in `verify()`; they never
//! block a migration from running.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{ArcanoxError, ArcanoxResult};

/// Length of a hex-encoded SHA-256 digest
pub const CHECKSUM_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationChecksumCalculator;

impl MigrationChecksumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Hex SHA-256 of the file's bytes
    pub async fn calculate_checksum(&self, path: &Path) -> ArcanoxResult<String> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ArcanoxError::io(path, e))?;
        Ok(Self::checksum_bytes(&content))
    }

    /// Recompute and compare against a stored checksum
    pub async fn verify_checksum(&self, path: &Path, expected: &str) -> ArcanoxResult<bool> {
        let actual = self.calculate_checksum(path).await?;
        Ok(actual == expected)
    }

    pub fn checksum_bytes(content: &[u8]) -> String {
        let digest = Sha256::digest(content);
        let mut encoded = hex::encode(digest);
        encoded.truncate(CHECKSUM_LENGTH);
        encoded
    }
}

//! Native `.pfor` artifact format.
//!
//! The format consists of a 32-byte header followed by a Postcard-encoded
//! payload.
//!
//! # Format Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                       │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                      │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a price model artifact.
pub const MAGIC: &[u8; 4] = b"PFOR";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Model Type
// ============================================================================

/// Model type identifier stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModelType {
    /// Bagged (averaged) tree ensemble.
    RandomForest = 0,
    /// Boosted (summed) tree ensemble.
    GradientBoosting = 1,
    /// Linear model.
    Linear = 2,
}

impl ModelType {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::RandomForest),
            1 => Some(Self::GradientBoosting),
            2 => Some(Self::Linear),
            _ => None,
        }
    }
}

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header for the native artifact format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("PFOR")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       1     Model type
/// 7       1     Reserved (padding)
/// 8       4     Reserved (flags space)
/// 12      4     Payload size (bytes)
/// 16      4     CRC32 checksum of payload
/// 20      4     Number of features
/// 24      8     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Model type.
    pub model_type: ModelType,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Number of input features.
    pub num_features: u32,
}

impl FormatHeader {
    /// Create a new header with the current version.
    pub fn new(model_type: ModelType, num_features: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            model_type,
            payload_size: 0,
            checksum: 0,
            num_features,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[6] = self.model_type as u8;
        // 7..12 reserved
        buf[12..16].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        buf[20..24].copy_from_slice(&self.num_features.to_le_bytes());
        // 24..32 reserved

        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];

        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let model_type = ModelType::from_u8(buf[6])
            .ok_or_else(|| DeserializeError::CorruptPayload("invalid model type".into()))?;

        let payload_size = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        let checksum = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        let num_features = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);

        Ok(Self {
            version_major,
            version_minor,
            model_type,
            payload_size,
            checksum,
            num_features,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// File is not a price model artifact (wrong magic).
    #[error("not a price model artifact")]
    NotAnArtifact,

    /// Artifact requires a newer format version.
    #[error("artifact requires format version {major}.{minor} or later", major = .major, minor = .minor)]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload is corrupt or malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Header model type disagrees with the payload.
    #[error("model type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: ModelType,
        actual: ModelType,
    },

    /// The artifact's feature schema disagrees with the expected one.
    #[error("schema mismatch: artifact was trained with {actual}, expected {expected}")]
    SchemaMismatch { expected: String, actual: String },

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// CRC32 Helper
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Header + Payload Framing
// ============================================================================

/// Write header and payload to a writer, filling in size and checksum.
pub fn write_framed<W: Write>(
    writer: &mut W,
    header: &mut FormatHeader,
    payload: &[u8],
) -> Result<(), SerializeError> {
    header.payload_size = payload.len() as u32;
    header.checksum = compute_checksum(payload);

    writer.write_all(&header.to_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}

/// Read header and checksum-verified payload from a reader.
pub fn read_framed<R: Read>(reader: &mut R) -> Result<(FormatHeader, Vec<u8>), DeserializeError> {
    let mut header_buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DeserializeError::Truncated {
                expected: HEADER_SIZE,
                actual: 0,
            }
        } else {
            DeserializeError::Io(e)
        }
    })?;

    let header = FormatHeader::from_bytes(&header_buf)?;

    let mut payload = vec![0u8; header.payload_size as usize];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            DeserializeError::Truncated {
                expected: header.payload_size as usize,
                actual: 0,
            }
        } else {
            DeserializeError::Io(e)
        }
    })?;

    let actual_checksum = compute_checksum(&payload);
    if actual_checksum != header.checksum {
        return Err(DeserializeError::ChecksumMismatch {
            expected: header.checksum,
            actual: actual_checksum,
        });
    }

    Ok((header, payload))
}

// ============================================================================
// Tests
// ============================================================================

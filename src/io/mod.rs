//! Model artifact serialization.
//!
//! An artifact is a 32-byte header (magic, version, model type, payload
//! size, CRC32 checksum, feature count) followed by a Postcard-encoded
//! payload carrying the feature schema, metadata, and estimator parameters.
//! Because the schema travels with the artifact, a serving process can
//! verify at load time that the model was trained for the features it is
//! about to receive.

pub mod convert;
pub mod native;
pub mod payload;

pub use native::{
    DeserializeError, FormatHeader, ModelType, SerializeError, CURRENT_VERSION_MAJOR,
    CURRENT_VERSION_MINOR, HEADER_SIZE, MAGIC,
};
pub use payload::{
    FieldPayload, ForestPayload, LinearPayload, MetaPayload, ModelPayload, Payload, PayloadV1,
    SchemaPayload, TreePayload,
};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::dataset::FeatureSchema;
use crate::model::PriceModel;

/// Serialize a model artifact to bytes.
pub fn to_bytes(model: &PriceModel) -> Result<Vec<u8>, SerializeError> {
    let payload = Payload::V1(convert::to_payload(model));
    let payload_bytes = postcard::to_allocvec(&payload)?;

    let mut header = FormatHeader::new(
        convert::model_type_of(model),
        model.n_features() as u32,
    );
    let mut out = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
    native::write_framed(&mut out, &mut header, &payload_bytes)?;
    Ok(out)
}

/// Deserialize a model artifact from bytes.
pub fn from_bytes(bytes: &[u8]) -> Result<PriceModel, DeserializeError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let (header, payload_bytes) = native::read_framed(&mut cursor)?;

    let Payload::V1(payload) = postcard::from_bytes(&payload_bytes)?;
    convert::from_payload(header.model_type, header.num_features, payload)
}

/// Save a model artifact to a file.
pub fn save(path: impl AsRef<Path>, model: &PriceModel) -> Result<(), SerializeError> {
    let payload = Payload::V1(convert::to_payload(model));
    let payload_bytes = postcard::to_allocvec(&payload)?;

    let mut header = FormatHeader::new(
        convert::model_type_of(model),
        model.n_features() as u32,
    );

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    native::write_framed(&mut writer, &mut header, &payload_bytes)?;
    Ok(())
}

/// Load a model artifact from a file.
pub fn load(path: impl AsRef<Path>) -> Result<PriceModel, DeserializeError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let (header, payload_bytes) = native::read_framed(&mut reader)?;

    let Payload::V1(payload) = postcard::from_bytes(&payload_bytes)?;
    convert::from_payload(header.model_type, header.num_features, payload)
}

/// Load a model artifact and require its stored schema to match `expected`.
///
/// This is the guard against serving a model whose training-time feature
/// order or types disagree with what the caller will feed it.
pub fn load_validated(
    path: impl AsRef<Path>,
    expected: &FeatureSchema,
) -> Result<PriceModel, DeserializeError> {
    let model = load(path)?;
    if model.schema() != expected {
        return Err(DeserializeError::SchemaMismatch {
            expected: expected.describe(),
            actual: model.schema().describe(),
        });
    }
    Ok(model)
}

use thiserror::Error;

use crate::AnnotationSet;

pub const ANNOTATION_FILE_MAGIC: [u8; 4] = *b"PDMA";
pub const ANNOTATION_FILE_VERSION: u32 = 1;
const ANNOTATION_HEADER_LEN: usize = ANNOTATION_FILE_MAGIC.len() + std::mem::size_of::<u32>();

#[derive(Debug, Error)]
pub enum AnnotationFileError {
    #[error("unsupported annotation file version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid annotation file")]
    InvalidData,
    #[error("failed to encode annotation file: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

pub fn encode_annotation_file(data: &AnnotationSet) -> Result<Vec<u8>, AnnotationFileError> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&ANNOTATION_FILE_MAGIC);
    payload.extend_from_slice(&ANNOTATION_FILE_VERSION.to_le_bytes());
    let body = bincode::encode_to_vec(data, bincode::config::standard())?;
    payload.extend_from_slice(&body);
    Ok(payload)
}

pub fn decode_annotation_file(payload: &[u8]) -> Result<AnnotationSet, AnnotationFileError> {
    if !(payload.len() >= ANNOTATION_HEADER_LEN && payload.starts_with(&ANNOTATION_FILE_MAGIC)) {
        return Err(AnnotationFileError::InvalidData);
    }
    let version = u32::from_le_bytes(
        payload[ANNOTATION_FILE_MAGIC.len()..ANNOTATION_HEADER_LEN]
            .try_into()
            .map_err(|_| AnnotationFileError::InvalidData)?,
    );
    let body = &payload[ANNOTATION_HEADER_LEN..];
    match version {
        1 => bincode::decode_from_slice(body, bincode::config::standard())
            .map(|(data, _)| data)
            .map_err(|_| AnnotationFileError::InvalidData),
        _ => Err(AnnotationFileError::UnsupportedVersion(version)),
    }
}

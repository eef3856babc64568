//! State codec — adjudication snapshots as a zipped JSON document.
//!
//! The archive holds a single DEFLATE entry named `iqr_state.json`:
//!
//! ```json
//! {"pos": [[uid, [f0, ...]], ...], "neg": [...], "external_pos": [...], "external_neg": [...]}
//! ```
//!
//! Working set, results, and view caches are not part of the snapshot; they
//! are reproduced by growing and refining again.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use iqr_core::constants::STATE_ZIP_FILENAME;
use iqr_core::descriptor::{DescriptorElement, DescriptorSet, DescriptorUid};
use iqr_core::errors::{IqrError, IqrResult, SessionError, StateError};
use iqr_core::traits::IDescriptorFactory;

use crate::adjudication::AdjudicationStore;

/// `(uid, vector)` pairs, serialized as `[uid, [f64, ...]]`.
pub type DescriptorRecords = Vec<(DescriptorUid, Vec<f64>)>;

/// Decoded body of a state archive.
///
/// Unknown top-level keys are ignored, so payloads wrapped with extra
/// front-end data still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    pub pos: DescriptorRecords,
    pub neg: DescriptorRecords,
    pub external_pos: DescriptorRecords,
    pub external_neg: DescriptorRecords,
}

impl StatePayload {
    pub fn from_store(store: &AdjudicationStore) -> IqrResult<Self> {
        Ok(Self {
            pos: records_of(&store.positive)?,
            neg: records_of(&store.negative)?,
            external_pos: records_of(&store.external_positive)?,
            external_neg: records_of(&store.external_negative)?,
        })
    }

    /// Rebuild adjudication sets through `factory`.
    ///
    /// Fails with `InconsistentDescriptor` when the factory hands back an
    /// element whose existing vector differs from the recorded one, and with
    /// `MalformedState` when the restored sets would overlap.
    pub fn restore(self, factory: &dyn IDescriptorFactory) -> IqrResult<AdjudicationStore> {
        let mut store = AdjudicationStore::new();
        for (records, target) in [
            (self.external_pos, &mut store.external_positive),
            (self.external_neg, &mut store.external_negative),
            (self.pos, &mut store.positive),
            (self.neg, &mut store.negative),
        ] {
            for (uid, vector) in records {
                target.insert(load_descriptor(factory, uid, vector)?);
            }
        }
        if !store.is_consistent() {
            return Err(StateError::MalformedState {
                reason: "a descriptor is adjudicated both positive and negative".to_string(),
            }
            .into());
        }
        Ok(store)
    }
}

/// Serialize adjudications into archive bytes.
pub fn encode_state(store: &AdjudicationStore) -> IqrResult<Vec<u8>> {
    let payload = StatePayload::from_store(store)?;
    let json = serde_json::to_vec(&payload).map_err(encode_failed)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file(STATE_ZIP_FILENAME, options)
        .map_err(encode_failed)?;
    writer.write_all(&json).map_err(encode_failed)?;
    let cursor = writer.finish().map_err(encode_failed)?;
    Ok(cursor.into_inner())
}

/// Parse archive bytes produced by `encode_state`.
pub fn decode_state(bytes: &[u8]) -> IqrResult<StatePayload> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;
    let mut entry = archive.by_name(STATE_ZIP_FILENAME).map_err(|_| {
        IqrError::from(StateError::MalformedState {
            reason: format!("archive does not contain {STATE_ZIP_FILENAME}"),
        })
    })?;
    let mut json = String::new();
    entry.read_to_string(&mut json).map_err(malformed)?;
    serde_json::from_str(&json).map_err(malformed)
}

fn records_of(set: &DescriptorSet) -> IqrResult<DescriptorRecords> {
    set.iter()
        .map(|d| -> IqrResult<(DescriptorUid, Vec<f64>)> {
            let vector = d.vector().ok_or_else(|| SessionError::MissingVector {
                uid: d.uid().to_string(),
            })?;
            Ok((d.uid().clone(), vector.to_vec()))
        })
        .collect()
}

fn load_descriptor(
    factory: &dyn IDescriptorFactory,
    uid: DescriptorUid,
    vector: Vec<f64>,
) -> IqrResult<Arc<DescriptorElement>> {
    let mut element = factory.new_descriptor(&uid);
    match element.vector() {
        Some(existing) if existing != vector.as_slice() => {
            return Err(StateError::InconsistentDescriptor {
                uid: uid.to_string(),
            }
            .into());
        }
        Some(_) => {}
        None => {
            factory.store_vector(&uid, &vector);
            element.set_vector(vector);
        }
    }
    Ok(Arc::new(element))
}

fn encode_failed(e: impl std::fmt::Display) -> IqrError {
    StateError::EncodeFailed {
        reason: e.to_string(),
    }
    .into()
}

fn malformed(e: impl std::fmt::Display) -> IqrError {
    StateError::MalformedState {
        reason: e.to_string(),
    }
    .into()
}

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use rvs_hash::Hasher;
use rvs_hash::ObjectId;
use rvs_object::header;
use rvs_object::{Object, ObjectKind};

use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Write an object to the store. Returns the OID.
    ///
    /// No-op if the object already exists (idempotent).
    /// The file is written atomically (temp file + rename).
    pub fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        let payload = obj.serialize_payload();
        self.write_payload(obj.kind(), &payload)
    }

    /// Write raw payload bytes with a known kind. Returns the OID.
    ///
    /// No-op if the object already exists (idempotent).
    pub fn write_payload(
        &self,
        kind: ObjectKind,
        payload: &[u8],
    ) -> Result<ObjectId, OdbError> {
        let hdr = header::write_header(kind, payload.len());

        // The OID is the hash of the uncompressed header + payload.
        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(payload);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        // Ensure the fan-out directory exists.
        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a temp file in the objects dir (same filesystem for atomic rename).
        let tmp_path = write_to_temp(&self.objects_dir, &hdr, payload, self.compression_level)?;
        finalize_object(&tmp_path, &final_path)?;

        Ok(oid)
    }
}

/// Compress header + payload into a temp file under `objects_dir`.
fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    payload: &[u8],
    level: flate2::Compression,
) -> Result<std::path::PathBuf, OdbError> {
    let tmp_path = objects_dir.join(format!(
        "tmp_obj_{}",
        std::process::id()
            ^ std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
    ));

    let file = fs::File::create(&tmp_path)?;
    let mut encoder = ZlibEncoder::new(file, level);
    encoder.write_all(hdr)?;
    encoder.write_all(payload)?;
    encoder.finish()?;

    Ok(tmp_path)
}

/// Atomically move a temp file to its final destination.
///
/// If the destination already exists (race with another writer), the temp
/// file is removed and the write is treated as successful — any concurrent
/// writer produced identical bytes.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), OdbError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(OdbError::Io(e))
        }
    }
}

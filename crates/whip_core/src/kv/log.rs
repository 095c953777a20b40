//! Batch record envelope and log replay.

use crate::error::{CoreError, CoreResult};
use crate::kv::batch::WriteBatch;
use whip_storage::StorageBackend;

/// Magic bytes identifying a batch record.
pub(crate) const BATCH_MAGIC: [u8; 4] = *b"WHPB";

/// Current batch record format version.
pub(crate) const BATCH_VERSION: u16 = 1;

/// magic (4) + version (2) + entry count (4) + payload length (4) + header crc (4)
pub(crate) const HEADER_SIZE: usize = 18;

/// Header bytes covered by the header crc.
const HEADER_BODY: usize = HEADER_SIZE - CRC_SIZE;

pub(crate) const CRC_SIZE: usize = 4;

/// Wraps a batch into a complete, checksummed log record.
pub(crate) fn encode_record(batch: &WriteBatch) -> CoreResult<Vec<u8>> {
    let payload = batch.encode_payload()?;
    let count = u32::try_from(batch.len())
        .map_err(|_| CoreError::invalid_input("too many entries in one batch"))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| CoreError::invalid_input("batch payload exceeds 4 GiB"))?;

    let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
    data.extend_from_slice(&BATCH_MAGIC);
    data.extend_from_slice(&BATCH_VERSION.to_le_bytes());
    data.extend_from_slice(&count.to_le_bytes());
    data.extend_from_slice(&len.to_le_bytes());
    let header_crc = compute_crc32(&data);
    data.extend_from_slice(&header_crc.to_le_bytes());
    data.extend_from_slice(&payload);

    let crc = compute_crc32(&data);
    data.extend_from_slice(&crc.to_le_bytes());

    Ok(data)
}

/// Replays every complete record in `backend`, oldest first.
///
/// Returns the offset just past the last complete record. Anything after
/// that offset is a torn tail the caller should cut off.
///
/// Appends land as a prefix of the record, so a header that is fully present
/// must also be intact. Only a short header or a short payload counts as
/// torn; a header failing its crc is corruption wherever it sits.
pub(crate) fn replay<F>(backend: &dyn StorageBackend, mut apply: F) -> CoreResult<u64>
where
    F: FnMut(WriteBatch),
{
    let size = backend.size()?;
    let mut offset = 0u64;

    while size - offset >= HEADER_SIZE as u64 {
        let header = backend.read_at(offset, HEADER_SIZE)?;

        let stored = le_u32(&header[HEADER_BODY..]);
        let computed = compute_crc32(&header[..HEADER_BODY]);
        if stored != computed {
            return Err(CoreError::log_corruption(format!(
                "header checksum mismatch at offset {offset}: \
                 stored {stored:#010x}, computed {computed:#010x}"
            )));
        }

        if header[0..4] != BATCH_MAGIC {
            return Err(CoreError::log_corruption(format!(
                "invalid magic at offset {offset}"
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version > BATCH_VERSION {
            return Err(CoreError::log_corruption(format!(
                "unsupported version {version} at offset {offset}"
            )));
        }

        let count = le_u32(&header[6..]);
        let len = u64::from(le_u32(&header[10..]));
        let total = HEADER_SIZE as u64 + len + CRC_SIZE as u64;

        if size - offset < total {
            break;
        }
        let total = usize::try_from(total).map_err(|_| {
            CoreError::log_corruption(format!("record at offset {offset} is too large to read"))
        })?;

        let record = backend.read_at(offset, total)?;
        let (body, crc_bytes) = record.split_at(total - CRC_SIZE);
        let expected = le_u32(crc_bytes);
        let actual = compute_crc32(body);
        if expected != actual {
            return Err(CoreError::ChecksumMismatch {
                offset,
                expected,
                actual,
            });
        }

        apply(WriteBatch::decode_payload(count, &body[HEADER_SIZE..])?);
        offset += total as u64;
    }

    Ok(offset)
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Computes the CRC32 (IEEE) checksum of `data`.
#[must_use]
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

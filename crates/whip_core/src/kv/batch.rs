//! Write batches.

use crate::error::{CoreError, CoreResult};

/// A group of key-value writes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty batch with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Adds a write. A later write to the same key wins.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of writes in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch holds no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the batch, yielding writes in insertion order.
    pub fn into_entries(self) -> impl Iterator<Item = (Vec<u8>, Vec<u8>)> {
        self.entries.into_iter()
    }

    /// Serializes the writes into a record payload.
    pub(crate) fn encode_payload(&self) -> CoreResult<Vec<u8>> {
        let size: usize = self
            .entries
            .iter()
            .map(|(k, v)| 8 + k.len() + v.len())
            .sum();
        let mut buf = Vec::with_capacity(size);

        for (key, value) in &self.entries {
            for part in [key, value] {
                let len = u32::try_from(part.len()).map_err(|_| {
                    CoreError::invalid_input(format!(
                        "batch entry of {} bytes exceeds the 4 GiB limit",
                        part.len()
                    ))
                })?;
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(part);
            }
        }

        Ok(buf)
    }

    /// Parses a record payload holding `count` writes.
    pub(crate) fn decode_payload(count: u32, payload: &[u8]) -> CoreResult<Self> {
        let mut cursor = 0usize;

        let read_part = |cursor: &mut usize| -> CoreResult<Vec<u8>> {
            let header_end = *cursor + 4;
            if header_end > payload.len() {
                return Err(CoreError::log_corruption("unexpected end of batch payload"));
            }
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(&payload[*cursor..header_end]);
            let len = u32::from_le_bytes(len_bytes) as usize;

            let end = header_end + len;
            if end > payload.len() {
                return Err(CoreError::log_corruption("batch entry overruns payload"));
            }
            *cursor = end;
            Ok(payload[header_end..end].to_vec())
        };

        let mut batch = Self::with_capacity((count as usize).min(payload.len() / 8));
        for _ in 0..count {
            let key = read_part(&mut cursor)?;
            let value = read_part(&mut cursor)?;
            batch.put(key, value);
        }

        if cursor != payload.len() {
            return Err(CoreError::log_corruption(format!(
                "trailing bytes in batch payload: expected {} bytes, got {}",
                cursor,
                payload.len()
            )));
        }

        Ok(batch)
    }
}

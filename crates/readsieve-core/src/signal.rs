//! Raw signal buffers as delivered by the instrument

use crate::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Sample width of a raw signal buffer. Samples are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleDtype {
    /// 16-bit signed samples (the usual ADC output)
    #[default]
    Int16,
    /// 32-bit signed samples
    Int32,
}

impl SampleDtype {
    /// Bytes per sample
    pub fn width(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 => 4,
        }
    }
}

/// Raw signal bytes plus the descriptor needed to interpret them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignal {
    data: Bytes,
    dtype: SampleDtype,
}

impl RawSignal {
    /// Wrap raw bytes of the given sample width
    pub fn new(data: Bytes, dtype: SampleDtype) -> Self {
        Self { data, dtype }
    }

    /// Encode 16-bit samples
    pub fn from_i16(samples: &[i16]) -> Self {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(Bytes::from(data), SampleDtype::Int16)
    }

    /// Encode 32-bit samples
    pub fn from_i32(samples: &[i32]) -> Self {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(Bytes::from(data), SampleDtype::Int32)
    }

    /// Sample width descriptor
    pub fn dtype(&self) -> SampleDtype {
        self.dtype
    }

    /// Size of the buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Number of whole samples in the buffer
    pub fn sample_count(&self) -> usize {
        self.data.len() / self.dtype.width()
    }

    /// Decode the buffer into i32 samples.
    ///
    /// A buffer whose length is not a multiple of the sample width is rejected
    /// instead of silently dropping the trailing bytes.
    pub fn decode(&self) -> Result<Vec<i32>> {
        let width = self.dtype.width();
        if self.data.len() % width != 0 {
            return Err(Error::signal(format!(
                "{} bytes is not a whole number of {:?} samples",
                self.data.len(),
                self.dtype
            )));
        }

        let samples = match self.dtype {
            SampleDtype::Int16 => self
                .data
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as i32)
                .collect(),
            SampleDtype::Int32 => self
                .data
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        };
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_int16() {
        let signal = RawSignal::from_i16(&[0, 1, -1, i16::MAX, i16::MIN]);
        assert_eq!(signal.sample_count(), 5);
        assert_eq!(signal.byte_len(), 10);
        assert_eq!(
            signal.decode().unwrap(),
            vec![0, 1, -1, i16::MAX as i32, i16::MIN as i32]
        );
    }

    #[test]
    fn test_decode_int32() {
        let signal = RawSignal::from_i32(&[70_000, -70_000]);
        assert_eq!(signal.dtype(), SampleDtype::Int32);
        assert_eq!(signal.decode().unwrap(), vec![70_000, -70_000]);
    }

    #[test]
    fn test_decode_rejects_ragged_buffer() {
        let signal = RawSignal::new(Bytes::from_static(&[1, 0, 2]), SampleDtype::Int16);
        let err = signal.decode().unwrap_err();
        assert!(matches!(err, Error::Signal(_)));
    }

    #[test]
    fn test_empty_buffer_decodes_to_nothing() {
        let signal = RawSignal::new(Bytes::new(), SampleDtype::Int32);
        assert!(signal.decode().unwrap().is_empty());
    }
}

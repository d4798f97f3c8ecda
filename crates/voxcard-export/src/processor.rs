//! Audio-processing collaborator: silence rendering and concatenation

use crate::error::ExportError;
use rodio::source::UniformSourceIterator;
use rodio::Decoder;
use std::io::Cursor;
use std::time::Duration;

/// Fixed output parameters for every exported file.
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;
pub const OUTPUT_CHANNELS: u16 = 1;

/// The two operations the export pipeline needs from a media toolchain.
/// Concatenation decodes every input before rejoining, so segments of
/// mixed origin (gateway MP3, rendered WAV) combine cleanly.
pub trait AudioProcessor: Send + Sync {
    fn render_silence(&self, duration: Duration) -> Result<Vec<u8>, ExportError>;
    fn concatenate(&self, segments: &[Vec<u8>]) -> Result<Vec<u8>, ExportError>;
}

/// Default processor producing 16-bit mono WAV at 44.1 kHz.
pub struct WavProcessor;

impl WavProcessor {
    pub fn new() -> Self {
        Self
    }

    fn output_spec() -> hound::WavSpec {
        hound::WavSpec {
            channels: OUTPUT_CHANNELS,
            sample_rate: OUTPUT_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl Default for WavProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProcessor for WavProcessor {
    fn render_silence(&self, duration: Duration) -> Result<Vec<u8>, ExportError> {
        let samples = (duration.as_secs_f64() * f64::from(OUTPUT_SAMPLE_RATE)).round() as u64;
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, Self::output_spec())
                .map_err(|e| ExportError::Processing(e.to_string()))?;
            for _ in 0..samples {
                writer
                    .write_sample(0i16)
                    .map_err(|e| ExportError::Processing(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| ExportError::Processing(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }

    fn concatenate(&self, segments: &[Vec<u8>]) -> Result<Vec<u8>, ExportError> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, Self::output_spec())
                .map_err(|e| ExportError::Processing(e.to_string()))?;
            for segment in segments {
                let decoder = Decoder::new(Cursor::new(segment.clone()))
                    .map_err(|e| ExportError::Processing(format!("decode failed: {e}")))?;
                let resampled: UniformSourceIterator<_, i16> =
                    UniformSourceIterator::new(decoder, OUTPUT_CHANNELS, OUTPUT_SAMPLE_RATE);
                for sample in resampled {
                    writer
                        .write_sample(sample)
                        .map_err(|e| ExportError::Processing(e.to_string()))?;
                }
            }
            writer
                .finalize()
                .map_err(|e| ExportError::Processing(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }
}

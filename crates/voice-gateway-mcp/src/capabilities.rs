// voice-gateway-mcp/src/capabilities.rs
// ============================================================================
// Module: Backend Capabilities
// Description: Capability interfaces consumed by the built-in tools.
// Purpose: Decouple tool contracts from voice backend implementations.
// Dependencies: serde, thiserror, voice-gateway-config
// ============================================================================

//! ## Overview
//! The gateway reaches the voice platform only through three narrow traits:
//! [`VoiceCatalog`], [`SpeechSynthesizer`], and [`StatusSource`]. All calls are
//! blocking and run on the execution bridge. The reference implementations
//! here are config-driven; [`WaveformSynthesizer`] renders a deterministic
//! PCM tone sequence and stands in when no external synthesizer is attached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::f64::consts::TAU;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::config::ToolsConfig;
use crate::config::VoiceConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Voice exposed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Voice identifier.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// BCP-47 locale tag.
    pub locale: String,
}

impl From<&VoiceConfig> for VoiceDescriptor {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            id: config.id.clone(),
            display_name: config.display_name.clone(),
            locale: config.locale.clone(),
        }
    }
}

/// Encoded audio returned by a synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
}

/// Capability failures.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Requested voice is not in the catalog.
    #[error("unknown voice: {0}")]
    UnknownVoice(String),
    /// Input the backend refuses to process.
    #[error("unsupported input: {0}")]
    Unsupported(String),
    /// Backend failure (internal detail).
    #[error("backend failure: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Voice catalog lookup.
pub trait VoiceCatalog: Send + Sync {
    /// Returns all voices in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the catalog is unavailable.
    fn voices(&self) -> Result<Vec<VoiceDescriptor>, CapabilityError>;

    /// Looks up one voice.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::UnknownVoice`] when the id is not listed.
    fn voice(&self, id: &str) -> Result<VoiceDescriptor, CapabilityError> {
        self.voices()?
            .into_iter()
            .find(|voice| voice.id == id)
            .ok_or_else(|| CapabilityError::UnknownVoice(id.to_string()))
    }
}

/// Text-to-speech backend.
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders `text` with `voice`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when synthesis fails.
    fn synthesize(&self, text: &str, voice: &VoiceDescriptor)
    -> Result<SynthesizedAudio, CapabilityError>;
}

/// Server status backend.
pub trait StatusSource: Send + Sync {
    /// Returns a human-readable status line.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when status cannot be determined.
    fn status(&self) -> Result<String, CapabilityError>;
}

// ============================================================================
// SECTION: Reference Implementations
// ============================================================================

/// Catalog backed by the `[[tools.voices]]` config entries.
#[derive(Debug, Clone)]
pub struct StaticVoiceCatalog {
    /// Voices in configured order.
    voices: Vec<VoiceDescriptor>,
}

impl StaticVoiceCatalog {
    /// Creates a catalog from an explicit voice list.
    #[must_use]
    pub const fn new(voices: Vec<VoiceDescriptor>) -> Self {
        Self {
            voices,
        }
    }

    /// Creates a catalog from tool config.
    #[must_use]
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.voices.iter().map(VoiceDescriptor::from).collect())
    }
}

impl VoiceCatalog for StaticVoiceCatalog {
    fn voices(&self) -> Result<Vec<VoiceDescriptor>, CapabilityError> {
        Ok(self.voices.clone())
    }
}

/// Status source returning a fixed message.
#[derive(Debug, Clone)]
pub struct FixedStatus(pub String);

impl StatusSource for FixedStatus {
    fn status(&self) -> Result<String, CapabilityError> {
        Ok(self.0.clone())
    }
}

/// Deterministic tone renderer producing 16-bit mono PCM WAV.
///
/// Each character becomes a short tone whose pitch depends on the character
/// and the voice id; whitespace becomes silence. The same input always yields
/// the same bytes.
#[derive(Debug, Clone, Copy)]
pub struct WaveformSynthesizer {
    /// Samples per second.
    sample_rate: u32,
    /// Tone length per character in milliseconds.
    symbol_ms: u32,
}

/// WAV MIME type.
const WAV_MIME: &str = "audio/wav";
/// Peak amplitude as a fraction of full scale.
const TONE_AMPLITUDE: f64 = 0.3;
/// RIFF chunk size excluding the data payload.
const WAV_HEADER_LEN: u32 = 36;

impl WaveformSynthesizer {
    /// Creates a synthesizer with explicit timing.
    #[must_use]
    pub const fn new(sample_rate: u32, symbol_ms: u32) -> Self {
        Self {
            sample_rate,
            symbol_ms,
        }
    }

    /// Pitch for one character under a voice.
    fn frequency(voice_seed: u32, ch: char) -> f64 {
        let base = 180.0 + f64::from(voice_seed % 120);
        base + f64::from(u32::from(ch) % 48) * 9.0
    }

    /// Samples per character and WAV data length for `symbols` characters.
    fn layout(&self, symbols: usize) -> Result<(usize, u32), CapabilityError> {
        let too_long = || CapabilityError::Unsupported("rendered audio too long".to_string());
        let per_symbol = u64::from(self.sample_rate) * u64::from(self.symbol_ms) / 1_000;
        let data_len = u64::try_from(symbols)
            .ok()
            .and_then(|symbols| per_symbol.checked_mul(symbols))
            .and_then(|samples| samples.checked_mul(2))
            .and_then(|bytes| u32::try_from(bytes).ok())
            .filter(|bytes| bytes.checked_add(WAV_HEADER_LEN).is_some())
            .ok_or_else(too_long)?;
        let per_symbol = usize::try_from(per_symbol).map_err(|_| too_long())?;
        Ok((per_symbol, data_len))
    }

    /// Encodes PCM samples as a WAV container.
    fn encode_wav(&self, samples: &[i16], data_len: u32) -> Result<Vec<u8>, CapabilityError> {
        let byte_rate = self
            .sample_rate
            .checked_mul(2)
            .ok_or_else(|| CapabilityError::Unsupported("sample rate too high".to_string()))?;
        let mut out = Vec::with_capacity(samples.len() * 2 + 44);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(WAV_HEADER_LEN + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16_u32.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&2_u16.to_le_bytes());
        out.extend_from_slice(&16_u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        Ok(out)
    }
}

impl Default for WaveformSynthesizer {
    fn default() -> Self {
        Self::new(8_000, 20)
    }
}

impl SpeechSynthesizer for WaveformSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceDescriptor,
    ) -> Result<SynthesizedAudio, CapabilityError> {
        if text.trim().is_empty() {
            return Err(CapabilityError::Unsupported("text must contain speakable characters".to_string()));
        }
        let voice_seed = voice.id.bytes().fold(0_u32, |acc, byte| acc.wrapping_mul(31).wrapping_add(u32::from(byte)));
        if self.sample_rate.checked_mul(2).is_none() {
            return Err(CapabilityError::Unsupported("sample rate too high".to_string()));
        }
        let symbols = text.chars().count();
        let (per_symbol, data_len) = self.layout(symbols)?;
        let rate = f64::from(self.sample_rate);
        let peak = f64::from(i16::MAX) * TONE_AMPLITUDE;
        let mut samples = Vec::with_capacity(per_symbol * symbols);
        for ch in text.chars() {
            if ch.is_whitespace() {
                samples.extend(std::iter::repeat_n(0_i16, per_symbol));
                continue;
            }
            let frequency = Self::frequency(voice_seed, ch);
            for index in 0 .. per_symbol {
                let t = index as f64 / rate;
                #[allow(clippy::cast_possible_truncation, reason = "Amplitude is bounded by peak.")]
                samples.push(((TAU * frequency * t).sin() * peak) as i16);
            }
        }
        Ok(SynthesizedAudio {
            bytes: self.encode_wav(&samples, data_len)?,
            mime_type: WAV_MIME,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

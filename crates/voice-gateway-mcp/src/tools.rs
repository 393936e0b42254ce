// voice-gateway-mcp/src/tools.rs
// ============================================================================
// Module: Built-in Tools
// Description: Descriptors for list_voices, generate_speech, get_server_status.
// Purpose: Bind capability interfaces to schema-typed tool contracts.
// Dependencies: base64, serde_json
// ============================================================================

//! ## Overview
//! Each built-in tool is a [`ToolDescriptor`] whose handler adapts one
//! capability call. Additional tools are added by registering more
//! descriptors on the same
//! [`RegistryBuilder`](crate::registry::RegistryBuilder); the gateway logic does not
//! change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use serde_json::json;

use crate::auth::Permission;
use crate::capabilities::CapabilityError;
use crate::capabilities::FixedStatus;
use crate::capabilities::SpeechSynthesizer;
use crate::capabilities::StaticVoiceCatalog;
use crate::capabilities::StatusSource;
use crate::capabilities::VoiceCatalog;
use crate::capabilities::WaveformSynthesizer;
use crate::config::ToolsConfig;
use crate::registry::HandlerError;
use crate::registry::ToolDescriptor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Voice catalog tool name.
pub const LIST_VOICES: &str = "list_voices";
/// Speech synthesis tool name.
pub const GENERATE_SPEECH: &str = "generate_speech";
/// Status tool name.
pub const GET_SERVER_STATUS: &str = "get_server_status";

/// Permission required to read the voice catalog.
pub const VOICES_READ: &str = "voices:read";
/// Permission required to synthesize speech.
pub const SPEECH_GENERATE: &str = "speech:generate";

/// Maximum accepted text length in characters.
const MAX_TEXT_CHARS: u64 = 4_096;

// ============================================================================
// SECTION: Capability Set
// ============================================================================

/// Backend capabilities wired into the built-in tools.
#[derive(Clone)]
pub struct Capabilities {
    /// Voice catalog.
    pub catalog: Arc<dyn VoiceCatalog>,
    /// Speech synthesizer.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Status source.
    pub status: Arc<dyn StatusSource>,
    /// Voice used when `voice_id` is omitted.
    pub default_voice: String,
}

impl Capabilities {
    /// Builds the reference capability set from tool config.
    #[must_use]
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            catalog: Arc::new(StaticVoiceCatalog::from_config(config)),
            synthesizer: Arc::new(WaveformSynthesizer::default()),
            status: Arc::new(FixedStatus(config.status_message.clone())),
            default_voice: config.default_voice.clone(),
        }
    }
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Returns the built-in tool descriptors in their canonical order.
#[must_use]
pub fn builtin_tools(capabilities: &Capabilities) -> Vec<ToolDescriptor> {
    vec![
        list_voices(Arc::clone(&capabilities.catalog)),
        generate_speech(
            Arc::clone(&capabilities.catalog),
            Arc::clone(&capabilities.synthesizer),
            capabilities.default_voice.clone(),
        ),
        get_server_status(Arc::clone(&capabilities.status)),
    ]
}

/// `list_voices` descriptor.
#[must_use]
pub fn list_voices(catalog: Arc<dyn VoiceCatalog>) -> ToolDescriptor {
    ToolDescriptor {
        name: LIST_VOICES.to_string(),
        description: "List available voices in catalog order.".to_string(),
        input_schema: empty_object_schema(),
        output_schema: json!({
            "type": "array",
            "items": {
                "type": "object",
                "required": ["id", "display_name", "locale"],
                "properties": {
                    "id": { "type": "string" },
                    "display_name": { "type": "string" },
                    "locale": { "type": "string" }
                },
                "additionalProperties": false
            }
        }),
        required_permission: Some(Permission::new(VOICES_READ)),
        timeout: None,
        handler: Arc::new(move |_arguments: Value| -> Result<Value, HandlerError> {
            let voices = catalog.voices().map_err(capability_error)?;
            serde_json::to_value(voices).map_err(|err| HandlerError::Backend(err.to_string()))
        }),
    }
}

/// `generate_speech` descriptor.
#[must_use]
pub fn generate_speech(
    catalog: Arc<dyn VoiceCatalog>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    default_voice: String,
) -> ToolDescriptor {
    ToolDescriptor {
        name: GENERATE_SPEECH.to_string(),
        description: "Synthesize speech for text with a catalog voice; returns base64 audio."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["text"],
            "properties": {
                "text": { "type": "string", "minLength": 1, "maxLength": MAX_TEXT_CHARS },
                "voice_id": { "type": "string", "minLength": 1 }
            },
            "additionalProperties": false
        }),
        output_schema: json!({
            "type": "object",
            "required": ["audio_base64", "mime_type", "voice_id"],
            "properties": {
                "audio_base64": { "type": "string", "minLength": 1 },
                "mime_type": { "type": "string" },
                "voice_id": { "type": "string" }
            },
            "additionalProperties": false
        }),
        required_permission: Some(Permission::new(SPEECH_GENERATE)),
        timeout: None,
        handler: Arc::new(move |arguments: Value| -> Result<Value, HandlerError> {
            let text = arguments.get("text").and_then(Value::as_str).unwrap_or_default();
            let voice_id =
                arguments.get("voice_id").and_then(Value::as_str).unwrap_or(default_voice.as_str());
            let voice = catalog.voice(voice_id).map_err(capability_error)?;
            let audio = synthesizer.synthesize(text, &voice).map_err(capability_error)?;
            Ok(json!({
                "audio_base64": STANDARD.encode(&audio.bytes),
                "mime_type": audio.mime_type,
                "voice_id": voice.id,
            }))
        }),
    }
}

/// `get_server_status` descriptor.
#[must_use]
pub fn get_server_status(status: Arc<dyn StatusSource>) -> ToolDescriptor {
    ToolDescriptor {
        name: GET_SERVER_STATUS.to_string(),
        description: "Return the gateway status line.".to_string(),
        input_schema: empty_object_schema(),
        output_schema: json!({ "type": "string" }),
        required_permission: None,
        timeout: None,
        handler: Arc::new(move |_arguments: Value| -> Result<Value, HandlerError> {
            status.status().map(Value::String).map_err(capability_error)
        }),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Schema accepting only an empty object.
fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {}, "additionalProperties": false })
}

/// Maps capability failures onto handler errors.
fn capability_error(error: CapabilityError) -> HandlerError {
    match error {
        CapabilityError::UnknownVoice(id) => {
            HandlerError::InvalidArguments(format!("unknown voice_id: {id}"))
        }
        CapabilityError::Unsupported(message) => HandlerError::InvalidArguments(message),
        CapabilityError::Backend(message) => HandlerError::Backend(message),
    }
}

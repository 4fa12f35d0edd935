//! TextToSpeechProvider implementation.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::audio::{SpeechClip, SpeechRequest, TextToSpeechProvider};
use crate::error::Result;
use crate::llms::LlmError;

use super::client::ElevenLabs;

/// Synthesis request body.
#[derive(Debug, Clone, Serialize)]
struct ElevenLabsSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: ElevenLabsVoiceSettings,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct ElevenLabsVoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabs {
    fn build_body<'a>(&'a self, request: &'a SpeechRequest) -> ElevenLabsSpeechRequest<'a> {
        ElevenLabsSpeechRequest {
            text: &request.input,
            model_id: self.model_id(),
            voice_settings: ElevenLabsVoiceSettings {
                stability: request.settings.stability,
                similarity_boost: request.settings.similarity_boost,
            },
        }
    }
}

#[async_trait]
impl TextToSpeechProvider for ElevenLabs {
    async fn speech(&self, request: &SpeechRequest) -> Result<SpeechClip> {
        let url = self.speech_url(&request.voice.id, request.sample_rate);
        debug!(voice = %request.voice.id, chars = request.input.len(), "requesting speech");

        let response = self
            .build_request(&url)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let audio = response.bytes().await.map_err(LlmError::from)?;
        SpeechClip::from_pcm_le(&audio, request.sample_rate, 1)
    }

    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::audio::VoiceSettings;
    use crate::llms::ElevenLabsConfig;

    #[test]
    fn body_carries_model_and_settings() {
        let client = ElevenLabs::new(ElevenLabsConfig::new("xi")).unwrap();
        let request = SpeechRequest::new("Hello there", "v1").settings(VoiceSettings::new(0.3, 0.5));

        let json = serde_json::to_value(client.build_body(&request)).unwrap();

        assert_eq!(json["text"], "Hello there");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert!((json["voice_settings"]["stability"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!((json["voice_settings"]["similarity_boost"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }
}

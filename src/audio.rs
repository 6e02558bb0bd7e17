// src/audio.rs
//! Audio format guessing and playback fallbacks.
//!
//! Nothing here inspects media: the format is guessed from extension-like
//! markers anywhere in the URL, and anything unrecognised is served as MP3.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    OggOpus,
    WebmOpus,
    Aac,
    Wav,
    Mpeg,
}

/// Marker → format, first match wins. Download links often carry the file
/// name in the query string, so the whole URL is searched.
const MARKERS: &[(&str, AudioFormat)] = &[
    (".opus", AudioFormat::OggOpus),
    (".ogg", AudioFormat::OggOpus),
    (".webm", AudioFormat::WebmOpus),
    (".m4a", AudioFormat::Aac),
    (".aac", AudioFormat::Aac),
    (".wav", AudioFormat::Wav),
];

impl AudioFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            AudioFormat::OggOpus => r#"audio/ogg; codecs="opus""#,
            AudioFormat::WebmOpus => r#"audio/webm; codecs="opus""#,
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mpeg => "audio/mpeg",
        }
    }

    /// Format implied by `url`, matched case-insensitively.
    pub fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        MARKERS
            .iter()
            .find(|(marker, _)| url.contains(marker))
            .map(|(_, format)| *format)
            .unwrap_or(AudioFormat::Mpeg)
    }
}

/// Device classes with different codec preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Android,
    Ios,
    Desktop,
}

impl DeviceType {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("android") {
            DeviceType::Android
        } else if ["iphone", "ipad", "ipod"].iter().any(|d| ua.contains(d)) {
            DeviceType::Ios
        } else {
            DeviceType::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioSource {
    pub src: String,
    #[serde(rename = "type")]
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSet {
    pub primary_url: String,
    pub primary_type: &'static str,
    pub sources: Vec<AudioSource>,
}

/// Ordered playback candidates for an Opus recording. MP3 and AAC renditions
/// are expected next to the `.opus` file under the same name.
pub fn source_set(opus_url: &str, device: DeviceType) -> SourceSet {
    let mp3 = swap_opus_extension(opus_url, "mp3");
    let aac = swap_opus_extension(opus_url, "m4a");
    let opus = opus_url.to_string();

    let candidates = match device {
        DeviceType::Android => vec![
            (mp3, AudioFormat::Mpeg),
            (aac, AudioFormat::Aac),
            (opus.clone(), AudioFormat::OggOpus),
            (opus, AudioFormat::WebmOpus),
        ],
        DeviceType::Ios => vec![
            (aac, AudioFormat::Aac),
            (mp3, AudioFormat::Mpeg),
            (opus, AudioFormat::OggOpus),
        ],
        DeviceType::Desktop => vec![
            (opus.clone(), AudioFormat::OggOpus),
            (opus, AudioFormat::WebmOpus),
            (mp3, AudioFormat::Mpeg),
            (aac, AudioFormat::Aac),
        ],
    };

    let mut seen = HashSet::new();
    let sources: Vec<AudioSource> = candidates
        .into_iter()
        .filter(|(src, _)| seen.insert(src.clone()))
        .map(|(src, format)| AudioSource {
            src,
            content_type: format.content_type(),
        })
        .collect();

    let (primary_url, primary_type) = match sources.first() {
        Some(first) => (first.src.clone(), first.content_type),
        None => (opus_url.to_string(), AudioFormat::OggOpus.content_type()),
    };

    SourceSet {
        primary_url,
        primary_type,
        sources,
    }
}

fn swap_opus_extension(url: &str, extension: &str) -> String {
    let split = url.len().saturating_sub(".opus".len());
    match url.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(".opus") => {
            format!("{}.{}", &url[..split], extension)
        }
        _ => url.to_string(),
    }
}

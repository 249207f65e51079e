//! Audio cache — word → synthesized audio artifact.
//!
//! ```text
//! resolve("cat") → index hit?  ── yes ──▶ cached AudioArtifact
//!                      │ no
//!                      ▼
//!     Synthesizer::synthesize (under timeout) → write temp → rename → index
//! ```
//!
//! The cache key is the literal word plus the voice parameters, so changing
//! voice, language, or rate never serves stale audio. Concurrent misses for the
//! same word may both synthesize; the last publish wins and readers only ever
//! see complete files.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use futures_util::StreamExt;
use tracing::{debug, error};

use spellbee_core::types::{AudioArtifact, SynthesisConfig, VoiceParams};

use crate::atomic::write_atomic;
use crate::error::SynthesisError;

/// Extension of every published artifact. The synthesizer is asked for WAV.
pub const AUDIO_EXTENSION: &str = "wav";

/// Upper bound on a single synthesized clip. Spoken single words are far below.
const MAX_AUDIO_BYTES: usize = 16 * 1024 * 1024;

// ─── Synthesis collaborator ────────────────────────────────────────────────

/// Text-to-speech capability: text in, encoded audio bytes out.
pub trait Synthesizer: Send + Sync + 'static {
    fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> impl Future<Output = Result<Vec<u8>, SynthesisError>> + Send;
}

/// Client for an OpenAI-compatible `/v1/audio/speech` endpoint (Kokoro).
#[derive(Clone)]
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSynthesizer {
    pub fn new(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/audio/speech", config.url.trim_end_matches('/')),
            timeout: config.timeout,
        })
    }
}

impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceParams) -> Result<Vec<u8>, SynthesisError> {
        let body = serde_json::json!({
            "input": text,
            "voice": voice.voice,
            "lang_code": voice.language,
            "model": "kokoro",
            "response_format": AUDIO_EXTENSION,
            "speed": voice.rate.speed(),
        });

        debug!("synth: POST {} ({} chars)", self.url, text.len());

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let mut audio = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            if audio.len() + chunk.len() > MAX_AUDIO_BYTES {
                return Err(SynthesisError::Status {
                    status: 413,
                    body: format!("audio exceeds {MAX_AUDIO_BYTES} bytes"),
                });
            }
            audio.extend_from_slice(&chunk);
        }

        Ok(audio)
    }
}

impl HttpSynthesizer {
    fn classify(&self, e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            SynthesisError::Timeout(self.timeout)
        } else {
            SynthesisError::Request(e)
        }
    }
}

// ─── Cache key ─────────────────────────────────────────────────────────────

/// Identity of one artifact: the literal word and the voice it was spoken in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    word: String,
    voice: VoiceParams,
}

impl CacheKey {
    pub fn new(word: &str, voice: &VoiceParams) -> Self {
        Self {
            word: word.to_string(),
            voice: voice.clone(),
        }
    }

    /// Stable file name derived from a hash of the full key.
    ///
    /// The name is handed to players before they guess, so it must not
    /// spell out the word.
    pub fn file_name(&self) -> String {
        format!("{:016x}.{AUDIO_EXTENSION}", self.digest())
    }

    fn digest(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        for part in [
            self.word.as_str(),
            self.voice.voice.as_str(),
            self.voice.language.as_str(),
            self.voice.rate.as_str(),
        ] {
            hash = fnv1a(hash, part.as_bytes());
            // separator so ("ab","c") and ("a","bc") differ
            hash = fnv1a(hash, &[0]);
        }
        hash
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, stable across processes and toolchains (unlike `DefaultHasher`).
fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// ─── Cache ─────────────────────────────────────────────────────────────────

/// Process-lifetime cache of synthesized words, published under `dir`.
pub struct AudioCache<S> {
    synth: S,
    voice: VoiceParams,
    dir: PathBuf,
    timeout: Duration,
    index: Mutex<HashMap<CacheKey, AudioArtifact>>,
}

impl<S: Synthesizer> AudioCache<S> {
    /// Create the cache directory if needed and return an empty cache.
    pub async fn open(
        synth: S,
        voice: VoiceParams,
        dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            synth,
            voice,
            dir,
            timeout,
            index: Mutex::new(HashMap::new()),
        })
    }

    /// Return the artifact for `word`, synthesizing it on first use.
    ///
    /// No retry: a failed or timed-out synthesis is returned to the caller
    /// and nothing is cached.
    pub async fn resolve(&self, word: &str) -> Result<AudioArtifact, SynthesisError> {
        let key = CacheKey::new(word, &self.voice);

        if let Some(hit) = self.lookup(&key) {
            debug!("audio: cache hit for {word:?}");
            return Ok(hit);
        }
        debug!("audio: cache miss for {word:?}, synthesizing");

        let pending = self.synth.synthesize(word, &self.voice);
        let bytes = match tokio::time::timeout(self.timeout, pending).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                error!("audio: synthesis failed for {word:?}: {e}");
                return Err(e);
            }
            Err(_) => {
                error!("audio: synthesis timed out for {word:?} after {:?}", self.timeout);
                return Err(SynthesisError::Timeout(self.timeout));
            }
        };
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        let file_name = key.file_name();
        let path = self.dir.join(&file_name);
        write_atomic(&path, bytes).await?;

        let artifact = AudioArtifact {
            word: word.to_string(),
            file_name,
            path,
            created_at: SystemTime::now(),
        };
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, artifact.clone());

        debug!("audio: published {}", artifact.path.display());
        Ok(artifact)
    }

    /// Whether `word` already has an artifact in this process.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup(&CacheKey::new(word, &self.voice)).is_some()
    }

    /// Read a published artifact by file name for serving.
    ///
    /// Only plain `.wav` names under the cache directory are accepted.
    pub async fn read(&self, file_name: &str) -> std::io::Result<Vec<u8>> {
        if !is_artifact_name(file_name) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid audio name {file_name:?}"),
            ));
        }
        tokio::fs::read(self.dir.join(file_name)).await
    }

    pub fn len(&self) -> usize {
        self.index.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn voice(&self) -> &VoiceParams {
        &self.voice
    }

    fn lookup(&self, key: &CacheKey) -> Option<AudioArtifact> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

fn is_artifact_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(&format!(".{AUDIO_EXTENSION}")) else {
        return false;
    };
    !stem.is_empty()
        && !name.starts_with('.')
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

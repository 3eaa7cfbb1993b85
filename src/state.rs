use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::breakdown::{BreakdownError, BreakdownOrchestrator};
use crate::core::phonetics::{
    CmuDictionary, DictionaryError, DictionaryLookup, PhonemeSource, VowelGroupSyllabifier,
};
use crate::core::tts::{GoogleTTS, SpeechSynthesis, SynthesisError};

/// Failures while building [`AppState`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Breakdown(#[from] BreakdownError),
}

/// Shared application state.
pub struct AppState {
    pub config: ServerConfig,
    pub breakdown: BreakdownOrchestrator,
}

impl AppState {
    /// Load the dictionary, build the Google provider and wire the
    /// orchestrator from `config`.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, StateError> {
        let dictionary = load_dictionary(&config)?;
        let synthesizer: Arc<dyn SpeechSynthesis> =
            Arc::new(GoogleTTS::new(config.google_tts_config())?);
        let breakdown = BreakdownOrchestrator::new(
            PhonemeSource::new(dictionary),
            Arc::new(VowelGroupSyllabifier::new()),
            synthesizer,
            config.breakdown_options(),
        )?;
        Ok(Self::with_orchestrator(config, breakdown))
    }

    /// State around an already built orchestrator.
    pub fn with_orchestrator(config: ServerConfig, breakdown: BreakdownOrchestrator) -> Arc<Self> {
        Arc::new(Self { config, breakdown })
    }
}

fn load_dictionary(config: &ServerConfig) -> Result<Arc<dyn DictionaryLookup>, DictionaryError> {
    match &config.dictionary_path {
        Some(path) => {
            let dictionary = CmuDictionary::from_path(path)?;
            info!("Pronouncing dictionary ready ({} words)", dictionary.len());
            Ok(Arc::new(dictionary))
        }
        None => {
            warn!(
                "CMUDICT_PATH not configured; every word uses the vowel heuristic and /word/ transcription"
            );
            Ok(Arc::new(CmuDictionary::empty()))
        }
    }
}

pub mod breakdown;
pub mod cache;
pub mod phonetics;
pub mod tts;

// Re-export commonly used types for convenience
pub use breakdown::{
    Breakdown, BreakdownError, BreakdownOptions, BreakdownOrchestrator, SyllableAudio, Word,
};
pub use cache::{CacheError, CacheKey, CacheLookup, CacheNamespace, CacheOutcome, ContentAddressedCache};
pub use phonetics::{
    AlternateSyllabifier, CmuDictionary, DictionaryLookup, PhonemeSequence, PhonemeSource,
    VowelGroupSyllabifier,
};
pub use tts::{
    AudioConfig, AudioEncoding, GoogleTTS, GoogleTTSConfig, SpeechSynthesis, SynthesisError,
    VoiceConfig,
};

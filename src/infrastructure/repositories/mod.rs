pub mod cloud_storage_repository;
pub mod google_long_audio_repository;
pub mod pdf_text_extractor;
pub mod polly_synthesis_task_repository;
pub mod speech_synthesizer_repository;
pub mod storage_repository;
pub mod text_extractor_repository;

pub use cloud_storage_repository::CloudStorageRepository;
pub use google_long_audio_repository::{GoogleLongAudioRepository, TokenSource};
pub use pdf_text_extractor::PdfTextExtractor;
pub use polly_synthesis_task_repository::PollySynthesisTaskRepository;
pub use speech_synthesizer_repository::SpeechSynthesizerRepository;
pub use storage_repository::{LocalTemporaryFile, ObjectDescriptor, StorageError, StorageRepository};
pub use text_extractor_repository::{ExtractionError, TextExtractorRepository};

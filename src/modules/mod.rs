pub mod lesson;
pub mod transcription;

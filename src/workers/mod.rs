pub mod job;
pub mod scheduler;
pub mod transcription_poller;
pub mod transcription_submitter;

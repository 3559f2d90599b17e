//! The AI counsellor: system-prompt assembly, reply parsing, action
//! execution, and the chat flow that ties them to the store and the
//! generation client.

pub mod actions;
pub mod executor;
pub mod prompt;
pub mod service;

pub use actions::{ParsedReply, RawAction};
pub use executor::{ActionOutcome, OutcomeStatus};
pub use service::{ChatResponse, CounsellorService, ReplyMessage};

//! Command handlers for the Coach CLI.

pub mod ask;
pub mod corpus;
pub mod prompts;

pub use ask::AskCommand;
pub use corpus::CorpusCommand;
pub use prompts::PromptsCommand;

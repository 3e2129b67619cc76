pub mod chatgpt;
pub mod conversation;
pub mod echo;

pub use chatgpt::{ChatGpt, ChatGptConfig, ChatGptFactory};
pub use conversation::Conversation;
pub use echo::{Echo, EchoFactory};

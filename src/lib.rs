//! Access.AI is a terminal chat client for Google's Gemini models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation state, the request lifecycle controller,
//!   image attachments, and persisted configuration.
//! - [`api`] defines the generative adapter seam and the Gemini REST client
//!   behind it.
//! - [`cli`] parses arguments and runs the interactive chat, one-shot `say`,
//!   model listing, and model probing commands.
//! - [`utils`] holds URL helpers and the conversation transcript log.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;

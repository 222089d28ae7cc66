//! mtgjudge - retrieval-augmented rules judge for Magic: The Gathering
//!
//! # Architecture
//!
//! - **acquire**: find and download the latest Comprehensive Rules text
//! - **chunking**: split the document into rule and glossary chunks
//! - **embedding** / **vector_db** / **indexer**: embed rules into Qdrant
//! - **rag** / **llm**: retrieve, build the judge prompt, call the hosted model
//! - **cli** / **telemetry** / **repl**: command line, logging, question loop

pub mod errors;

pub mod acquire;
pub mod chunking;

pub mod embedding;
pub mod indexer;
pub mod vector_db;

pub mod llm;
pub mod rag;

pub mod cli;
pub mod repl;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{JudgeError, Result};

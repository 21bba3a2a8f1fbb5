//! Translate text into Japanese through the OpenAI chat completion endpoint
//! and show the result in a short-lived window.
//!
//! [`orchestrator::Orchestrator`] ties the pieces together: it puts a loading
//! page on the [`display::DisplayHandle`], runs a [`translate::Translator`] on a
//! worker thread, and only hands the result back to the UI thread while the
//! display is still alive.

pub mod client;
pub mod completion;
pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod orchestrator;
pub mod render;
pub mod request;
pub mod translate;
pub mod viewer;

pub use error::{Error, Result};

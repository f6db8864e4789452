//! Gemini provider implementation
//!
//! This module provides an adapter for the Generative Language API,
//! translating between the canonical chat contract and Gemini's format.

mod client;
pub mod converter;
pub mod streaming;
pub mod tools;
pub mod types;

pub use client::GeminiClient;
pub use types::{GeminiContent, GeminiPart, GeminiRole, GenerateContentRequest, GenerateContentResponse};

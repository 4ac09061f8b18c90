//! # craftmargin
//!
//! Unit economics and pricing advice for people who sell what they make.
//!
//! This library provides:
//! - A deterministic pricing engine: costs, marketplace fees, profit and margin
//! - A closed-form solver for the price that reaches a target margin
//! - AI pricing advice over three providers with ordered fallback
//! - An HTTP API over both
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────┐        ┌──────────────────────────────┐
//!   │  HTTP API    │───────▶│  pricing (pure, synchronous) │
//!   │  (axum)      │        └──────────────────────────────┘
//!   │              │        ┌──────────────────────────────┐
//!   │              │───────▶│  advisory                    │
//!   └──────────────┘        │  prompts ─▶ chain ─▶ schema  │
//!                           └──────────────┬───────────────┘
//!                                          ▼
//!                           ┌──────────────────────────────┐
//!                           │  FallbackChain               │
//!                           │  DeepSeek ▶ Gemini ▶ OpenAI  │
//!                           └──────────────────────────────┘
//! ```
//!
//! ## Advisory Flow
//! 1. Check entitlement and required fields
//! 2. Build a prompt that names the exact JSON shape expected back
//! 3. Try each provider tier in order until one answers
//! 4. Validate the whole reply against its schema, or fail the call
//!
//! ## Modules
//! - `pricing`: Cost resolution, fee model, optimal price solver
//! - `llm`: Provider adapters and the fallback chain
//! - `advisory`: Prompt builders, reply validation, entitlement gate
//! - `api`: HTTP routes
//! - `config`: Environment configuration

pub mod advisory;
pub mod api;
pub mod config;
pub mod llm;
pub mod pricing;

pub use config::Config;

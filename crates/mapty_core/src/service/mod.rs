//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and persistence calls into use-case level flows.
//! - Keep view/CLI layers decoupled from storage details.

pub mod workout_service;

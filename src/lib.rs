//! Credit Risk Assessment API Library
//!
//! Core functionality for the credit risk assessment service: strict
//! request validation, the fixed feature-vector contract with the trained
//! artifacts, artifact loading, risk scoring, and the HTTP handlers.
//!
//! # Modules
//!
//! - `artifacts`: Loading and evaluation of the fitted model artifacts.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `features`: Feature normalization and the column-order contract.
//! - `handlers`: HTTP request handlers and application state.
//! - `models`: Core data models and API payloads.
//! - `scoring`: Risk scorer and its capability traits.

pub mod artifacts;
pub mod config;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod models;
pub mod scoring;

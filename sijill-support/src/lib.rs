//! # Sijill Support
//!
//! Shared text helpers for the Sijill container.
//!
//! This crate provides:
//! - Rendering of resolution chains for error messages
//! - "Did you mean?" suggestions over registered token names

pub mod rendering;

//! Integration tests for whole encoding sessions
//!
//! Scripted event streams are played through a [`crate::Session`] and the
//! written recordings and analytics are checked.

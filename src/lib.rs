//! Face Verification Service
//!
//! This library provides the core functionality for the face-verify-hw system,
//! which accepts two uploaded images and asks an external face-recognition
//! service (DeepFace) whether they show the same person.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

//! SAR Image Colorization Service
//!
//! This library provides the core functionality for the sar-colorize-hw
//! system: an HTTP API that accepts grayscale SAR image uploads, forwards
//! them to a colorization model server, and tracks each upload through an
//! asynchronous job lifecycle until the colorized result is fetched.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;

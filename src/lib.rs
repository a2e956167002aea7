//! Core of an image comparison viewer.
//!
//! Resolves dropped or launched paths into a navigable set of images and
//! sequences screen captures of the comparison view. Window, menus and image
//! compositing belong to the embedding application.

pub mod config;
pub mod error;
pub mod file_utils;
pub mod image_cache;
pub mod image_loader;
pub mod services;
pub mod state;

pub use error::{AppError, Result};

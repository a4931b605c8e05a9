//! Backend storage services for the image upload relay
//!
//! This crate provides the document store that records the public URL of every
//! successfully hosted upload.

pub mod image_record;

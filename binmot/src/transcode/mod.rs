//! Conversions from parsed MOT files to other formats.

pub mod yaml;

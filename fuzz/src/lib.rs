//! Shared support for the fuzz targets.

pub mod seeds;

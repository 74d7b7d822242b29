//! Writing build output to disk.

pub mod writer;

pub use writer::write_bundle_to;

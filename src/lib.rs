//! Split manga page images into numbered panel, text and illustration frames.
//!
//! The [`pipeline`] walks `chapter_<NNN>` directories in order, runs a
//! [`segment::RegionDetector`] over every page, filters the candidates and
//! writes the survivors as `frame_<NNNNNN>.png` into one flat directory.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod segment;

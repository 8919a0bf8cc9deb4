//! Core library for outliner
//!
//! This crate implements the **Functional Core** of the outliner application:
//! it infers a document title and a three-level heading outline from page
//! layout alone, with zero I/O.
//!
//! # Architecture Overview
//!
//! - **`outline_core`** (this crate): pure classification logic
//! - **`pdf_layout`**: decodes PDF bytes into [`LayoutPage`]s
//! - **`outliner`**: the CLI shell (batch driving, JSON output, logging)
//!
//! # Pipeline
//!
//! ```text
//! LayoutPage[] -> LineRecord -> FeatureRecord -> Verdict -> HeadingLevel -> DocumentOutline
//!                  (per line)    features         classify   level          builder
//! ```
//!
//! # Module Organization
//!
//! - [`types`]: layout input and outline output data model
//! - [`annotate`]: part-of-speech annotator contract and the default lexicon annotator
//! - [`config`]: classifier thresholds, loadable from TOML
//! - [`features`]: per-line feature extraction
//! - [`classify`]: gate-then-score heading decision
//! - [`level`]: numbering-pattern level assignment
//! - [`builder`]: document pass, title capture, and title fallback
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use outline_core::{
//!     BoundingBox, LayoutBlock, LayoutLine, LayoutPage, LexiconAnnotator, OutlineBuilder,
//!     OutlineConfig, PageGeometry, StyleSpan, FLAG_BOLD,
//! };
//!
//! let line = LayoutLine::new(
//!     BoundingBox::new(240.0, 100.0, 360.0, 118.0),
//!     vec![StyleSpan::new("Introduction", 18.0, FLAG_BOLD)],
//! );
//! let page = LayoutPage::new(
//!     PageGeometry::new(600.0, 800.0),
//!     vec![LayoutBlock { lines: vec![line] }],
//! );
//!
//! let builder = OutlineBuilder::new(Arc::new(LexiconAnnotator::new()), OutlineConfig::default());
//! let outline = builder.build(&[page]);
//! assert_eq!(outline.title, "Introduction");
//! ```

pub mod annotate;
pub mod builder;
pub mod classify;
pub mod config;
pub mod features;
pub mod level;
pub mod types;

pub use annotate::{Annotator, LexiconAnnotator, PosCounts, PosTag};
pub use builder::{fallback_title, LineReport, OutlineBuilder};
pub use classify::{classify, is_heading, Disqualification, Verdict};
pub use config::{ConfigError, OutlineConfig};
pub use features::{FeatureExtractor, FeatureRecord, PageContext};
pub use level::assign_level;
pub use types::*;

//! # area-statistics
//!
//! Rank enrichment ("AREA") of binary sample attributes along continuous rankings.
//!
//! For every pair of a binary attribute (for example presence of a comorbidity) and a
//! ranking column (for example a gene's expression across samples), the samples are
//! sorted by the ranking and the positions of the attribute's hits are summarized by an
//! area-under-curve enrichment score. Significance comes from a permutation null built
//! once per attribute, and all p-values are corrected together at the end.
//!
//! ## Core Features
//!
//! - **Enrichment score**: trapezoidal area between the running hit curve and a straight reference
//! - **Permutation null**: seeded, reproducible, shared by every ranking column of an attribute
//! - **Significance**: sign-asymmetric Gaussian calibration into a NES and one-sided p-value
//! - **Multiple Testing Correction**: Bonferroni, Holm, Benjamini-Hochberg and Benjamini-Yekutieli
//! - **Parallel evaluation**: one unit of work per attribute on a `rayon` pool, with an explicit failure policy
//!
//! ## Module Organization
//!
//! - **[`enrichment`]**: area score, null distributions and array backends
//! - **[`testing`]**: significance evaluation and multiple testing correction
//! - **[`plan`]**: the per-pair work plan
//! - **[`orchestrate`]**: parallel evaluation of the plan
//! - **[`pipeline`]**: the end-to-end run over CSV inputs

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod io;
pub mod orchestrate;
pub mod pipeline;
pub mod plan;
pub mod table;
pub mod testing;

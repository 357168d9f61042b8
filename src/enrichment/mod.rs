//! Area-under-curve enrichment of binary attributes along a ranking.
//!
//! ## Available Methods
//!
//! - **Area score** (`area`): the running-curve enrichment score of one ordered indicator sequence
//! - **Null distribution** (`null`): permutation scores used to calibrate an observed area score
//! - **Backends** (`backend`): the numeric array strategy the score is computed with
//!
//! ## Quick Example
//!
//! ```rust
//! use area_statistics::enrichment::{Backend, area_score, null_distribution};
//!
//! let backend = Backend::Cpu.array_backend();
//! let indicators = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
//! let observed = area_score(backend, &indicators).unwrap();
//! let null = null_distribution(backend, &indicators, 100, 42).unwrap();
//! assert!(observed.score > 0.0);
//! assert_eq!(null.len(), 100);
//! ```

pub mod area;
pub mod backend;
pub mod null;

pub use area::{EnrichmentResult, area_score};
pub use backend::{ArrayBackend, Backend, CpuBackend};
pub use null::null_distribution;

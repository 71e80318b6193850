// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Slide Report
//!
//! Printable PDF reports of presentation results.
//!
//! ## Features
//!
//! - **Two export tiers**: full reports with tables, charts and join codes,
//!   or chart-only summaries
//! - **Table layout**: content-aware column widths, wrapped cells and
//!   page-break safe rows
//! - **Bar charts**: scaled bars with value and category labels,
//!   highlighted correct answers
//! - **Join codes**: QR images linking participants to the presentation
//! - **Pluggable output**: everything is drawn through a
//!   [`DrawingSurface`](surface::DrawingSurface); a recording surface makes
//!   layouts observable in tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use slide_report::config::ReportConfig;
//! use slide_report::report::{order_units, save_report_pdf, ReportRequest};
//!
//! # fn main() -> slide_report::Result<()> {
//! let json = std::fs::read_to_string("results.json")?;
//! let mut request = ReportRequest::from_json_str(&json)?;
//! request.units = order_units(&request.units);
//! let path = save_report_pdf(&request, &ReportConfig::default(), std::path::Path::new("."))?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;

pub mod object;

pub mod writer;

pub mod surface;

pub mod report;

pub mod config;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

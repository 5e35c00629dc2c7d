//! Coarse client classification: browser, operating system, device form
//! factor and rendering engine, from a User-Agent string and optional
//! structured client hints.
//!
//! ```no_run
//! use ua_classifier::{Classifier, RuntimeSignals};
//!
//! let classifier = Classifier::new()?;
//! let result = classifier.classify_user_agent(
//!     "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
//!      (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
//! );
//! assert_eq!(result.browser.name, "Safari");
//!
//! let signals = RuntimeSignals::new("Mozilla/5.0 (Windows NT 10.0)").with_brave(true);
//! let _ = classifier.classify(None, &signals);
//! # Ok::<(), ua_classifier::Error>(())
//! ```

mod classifier;
mod client_hints;
mod db;
mod error;
mod headers;
mod literal;
mod parser;
mod parser_data;
mod types;
mod user_agent;

pub use classifier::Classifier;
pub use error::{Error, Result};
pub use types::*;

//! EGRET — a static regex analysis engine.
//!
//! Given a regular expression and a representative "base substring", the
//! engine lowers the regex to an acyclic NFA, enumerates a minimal basis set
//! of paths covering every reachable state, and walks each path to derive
//! test strings: a canonical match, a minimum-iteration match, and a battery
//! of "evil" mutations designed to violate the regex. In check mode it
//! instead runs a fixed suite of structural diagnostics over the same paths
//! and reports them as advisory alerts.
//!
//! The engine never executes the regex against any input; it reasons about
//! the regex's own structure. See [`run_engine`] for the single entry point.

pub mod alert;
pub mod charset;
pub mod checker;
pub mod engine;
pub mod error;
pub mod generator;
pub mod location;
pub mod nfa;
pub mod parse_tree;
pub mod parser;
pub mod path;
pub mod scanner;
pub mod stats;
pub mod token;

pub use alert::{Alert, AlertKind, AlertSink, EngineOptions};
pub use engine::run_engine;
pub use error::{EngineError, EngineResult, ParseError, ScanError};
pub use location::Location;
pub use path::Path;

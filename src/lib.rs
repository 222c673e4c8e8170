//! Chemical graphs with pattern atoms and bonds, graph and subgraph
//! isomorphism between them, and ring perception.

mod element;
pub use element::*;

mod intern;
pub use intern::*;

mod atom;
pub use atom::*;

mod graph;
pub use graph::*;

mod matching;
pub use matching::*;

mod rings;
pub use rings::*;

mod resonance;
pub use resonance::*;

#[cfg(test)]
mod adjlist;

use tracing::Level;

/// Install a formatting subscriber at `level` ("error" through "trace").
/// Unrecognized levels fall back to `info`, and calling this again after a
/// subscriber is installed does nothing.
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

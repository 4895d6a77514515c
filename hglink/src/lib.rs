// src/lib.rs
pub mod linking {
    pub mod config;
    pub mod propagator;
    pub mod window;
    pub mod compatibility;
    pub mod engine;
}

// Re-export commonly used types
pub use linking::config::LinkingConfig;
pub use linking::engine::{Event, LinkingEngine};
pub use linking::propagator::{StraightLinePropagator, TrackPropagator};

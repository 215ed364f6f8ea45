//! FROST - frosted-glass compositing for wgpu hosts
//!
//! This is the root crate containing the headless demo and its simulated host.
//! The actual implementation lives in:
//! - `frost-core` - Geometry, scheduling, bindings and kernel math
//! - `frost-renderer` - GPU pipelines and the `FrostedGlass` widget
//! - `frost-config` - ~/.frost/config.toml
//!
//! Run the demo:
//! ```sh
//! cargo run -- out/
//! ```

pub mod scene;

pub use scene::{DemoScene, WINDOW, background_pixels};

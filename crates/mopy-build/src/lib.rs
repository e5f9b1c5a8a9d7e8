//! Dockerfile generation for Python projects described by `mopy.toml`.
//!
//! # Pipeline
//!
//! ```text
//! MopyConfig (validated)
//!   1. Classify   ── DependencyPlan::resolve()   one pass, local indices fixed
//!   2. Builder    ── stage::build_stage()        apt, env, COPY --link, pip install, cleanup
//!   3. Runtime    ── stage::run_stage()          base image, labels, env, .local, project
//!   4. Text       ── DockerfileGenerator::render()
//! ```
//!
//! # Runtime base image
//!
//! - **Python 3.9 on amd64/arm64**: digest-pinned distroless image
//! - **Anything else**: `python:<version>-slim` plus a `nonroot` user (65532)
//!
//! Rendering is a pure function of the config, the target [`Arch`], and the
//! [`BuildDefaults`]; the same inputs always yield byte-identical output.

pub mod base_image;
pub mod defaults;
pub mod dockerfile;
pub mod eject;
pub mod merge;
pub mod plan;
pub mod stage;

pub use base_image::{Arch, BaseImage};
pub use defaults::BuildDefaults;
pub use dockerfile::DockerfileGenerator;
pub use plan::DependencyPlan;

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate serde;

pub mod config;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod query;
pub mod render;
pub mod signature;
pub mod stage1;
pub mod stage2;
pub mod types;

pub use config::{Config, Logger, TracingLogger};
pub use error::Error;
pub use executor::{Executor, Row};
pub use types::Model;

/// Read the catalog and build the intermediate model
pub fn model<E: Executor>(executor: &mut E, config: &Config, logger: &dyn Logger) -> Result<Model, Error> {
    let catalog = stage1::run(executor, config)?;
    Ok(stage2::run(catalog, config.dialect, logger))
}

// Run the transformation
pub fn run<E: Executor>(executor: &mut E, config: &Config, logger: &dyn Logger) -> Result<codegen::Scope, Error> {
    let model = model(executor, config, logger)?;
    Ok(render::run(&model, &config.prelude))
}

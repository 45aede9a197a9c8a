//! The model describes the fires, equipment and sites to be planned for.
use crate::configuration::Configuration;
use crate::input::read_relay_problem;
use crate::relay::RelayProblem;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub config: Configuration,
    /// The relay deployment problem, if the model includes sites
    pub relay_problem: Option<RelayProblem>,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let config = Configuration::from_path(model_dir)?;
        let relay_problem = read_relay_problem(model_dir, config.deployment.link_radius)?;

        Ok(Model {
            model_path: model_dir.to_path_buf(),
            config,
            relay_problem,
        })
    }
}

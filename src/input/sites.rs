//! Code for reading the locations of the command centre, frontline teams and relay sites.
use super::{input_err_msg, read_csv};
use crate::relay::{Position, RelayProblem};
use crate::units::Kilometres;
use anyhow::{Context, Result, ensure};
use log::info;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const SITES_FILE_NAME: &str = "sites.csv";

/// The role of a site
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Clone, Copy)]
enum SiteKind {
    #[string = "command_centre"]
    CommandCentre,
    #[string = "frontline"]
    Frontline,
    #[string = "candidate"]
    Candidate,
}

/// A row of the sites CSV file
#[derive(Deserialize, Debug, PartialEq)]
struct SiteRaw {
    kind: SiteKind,
    x: f64,
    y: f64,
}

/// Read the relay deployment problem from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `radius` - Maximum link distance for relays and the command centre
///
/// # Returns
///
/// The problem, `None` if there is no sites file or an error if the file is invalid.
pub fn read_relay_problem(model_dir: &Path, radius: Kilometres) -> Result<Option<RelayProblem>> {
    let file_path = model_dir.join(SITES_FILE_NAME);
    if !file_path.exists() {
        info!("No {SITES_FILE_NAME} found; relay deployment will be skipped");
        return Ok(None);
    }

    let sites = read_csv(&file_path)?;
    let problem =
        read_relay_problem_from_iter(sites, radius).with_context(|| input_err_msg(&file_path))?;

    Ok(Some(problem))
}

fn read_relay_problem_from_iter<I>(iter: I, radius: Kilometres) -> Result<RelayProblem>
where
    I: Iterator<Item = SiteRaw>,
{
    let mut command_centre = None;
    let mut frontlines = Vec::new();
    let mut candidates = Vec::new();
    for site in iter {
        ensure!(
            site.x.is_finite() && site.y.is_finite(),
            "Site coordinates must be finite numbers"
        );

        let position = Position::new(site.x, site.y);
        match site.kind {
            SiteKind::CommandCentre => {
                ensure!(
                    command_centre.replace(position).is_none(),
                    "There must be exactly one command_centre"
                );
            }
            SiteKind::Frontline => frontlines.push(position),
            SiteKind::Candidate => candidates.push(position),
        }
    }

    let command_centre = command_centre.context("There must be exactly one command_centre")?;

    Ok(RelayProblem {
        command_centre,
        frontlines,
        candidates,
        radius,
    })
}

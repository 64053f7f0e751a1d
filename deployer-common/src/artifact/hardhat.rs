//! Reads the artifacts directory written by Hardhat's compile task.
//!
//! Every contract gets its own `artifacts/<sourceName>/<contractName>.json`
//! file with a `.dbg.json` sibling, and compiler inputs are kept under
//! `artifacts/build-info`. Only the contract files are parsed.

use crate::artifact::Artifact;
use crate::errors::ArtifactError;
use crate::Contract;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Value of the `_format` field of contract artifacts.
pub const ARTIFACT_FORMAT: &str = "hh-sol-artifact-1";

const BUILD_INFO_DIR: &str = "build-info";
const DBG_SUFFIX: &str = ".dbg.json";

#[derive(Deserialize)]
struct ContractFile {
    #[serde(rename = "_format")]
    format: String,
    #[serde(flatten)]
    contract: Contract,
}

/// Loads every contract found under `dir`, descending into source
/// directories. Two files declaring the same fully qualified name are an
/// error.
pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Artifact, ArtifactError> {
    let dir = dir.as_ref();
    let mut artifact = Artifact::with_origin(dir.display().to_string());
    collect(dir, &mut artifact)?;
    Ok(artifact)
}

fn collect(dir: &Path, artifact: &mut Artifact) -> Result<(), ArtifactError> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    // Directory order differs between file systems; duplicates must be
    // reported the same way everywhere.
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if entry.file_type()?.is_dir() {
            if file_name != BUILD_INFO_DIR {
                collect(&path, artifact)?;
            }
        } else if file_name.ends_with(".json") && !file_name.ends_with(DBG_SUFFIX) {
            let contract = read_contract(&path).map_err(|err| ArtifactError::File {
                path: path.clone(),
                source: Box::new(err),
            })?;
            let qualified = contract.fully_qualified_name();
            if artifact.insert(contract).is_some() {
                return Err(ArtifactError::DuplicateContract(qualified));
            }
        }
    }

    Ok(())
}

fn read_contract(path: &Path) -> Result<Contract, ArtifactError> {
    let file: ContractFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    if file.format != ARTIFACT_FORMAT {
        return Err(ArtifactError::UnsupportedFormat(file.format));
    }
    Ok(file.contract)
}

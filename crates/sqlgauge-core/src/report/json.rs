use std::path::Path;

use super::RunArtifacts;

pub fn write_json(artifacts: &RunArtifacts, path: &Path) -> anyhow::Result<()> {
    let f = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(f, artifacts)?;
    Ok(())
}

pub fn read_json(path: &Path) -> anyhow::Result<RunArtifacts> {
    let f = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(f))?)
}

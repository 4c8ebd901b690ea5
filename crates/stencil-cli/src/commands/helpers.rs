//! `stencil helpers ...`.

use uuid::Uuid;

use crate::{cli::HelpersCommands, error::CliResult, output::OutputManager};

pub fn execute(cmd: HelpersCommands, output: OutputManager) -> CliResult<()> {
    match cmd {
        HelpersCommands::GenerateUuids { count } => {
            for uuid in generate_uuids(count) {
                output.data(&uuid.to_string())?;
            }
        }
    }
    Ok(())
}

fn generate_uuids(count: u32) -> Vec<Uuid> {
    (0..count).map(|_| Uuid::new_v4()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuids_are_fresh_v4() {
        let uuids = generate_uuids(5);
        assert_eq!(uuids.len(), 5);
        assert!(uuids.iter().all(|u| u.get_version_num() == 4));
        assert_eq!(uuids.iter().collect::<HashSet<_>>().len(), 5);
    }
}

//! In-process implementations of the Convert and Break stages.

pub mod convert;
pub mod fragments;

use anyhow::{bail, Result};

use crate::layout::RunLayout;
use crate::stage::Stage;

/// Run the built-in implementation of `stage` against the layout.
///
/// # Errors
///
/// Fails if the stage has no built-in or the built-in itself fails.
pub fn run(stage: Stage, layout: &RunLayout, records_key: &str) -> Result<()> {
    match stage {
        Stage::Convert => {
            convert::convert(&layout.source, &layout.records, records_key)?;
        }
        Stage::Break => {
            fragments::break_records(&layout.records, &layout.fragments, records_key)?;
        }
        other => bail!("{other} has no built-in implementation; configure a command"),
    }
    Ok(())
}

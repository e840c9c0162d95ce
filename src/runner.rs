use anyhow::Context;

use crate::config::UnrollConfig;
use crate::{drdl, unroll};

/// Read, rewrite and write one DRDL file.
///
/// The output file is only written once every document and database has been
/// rewritten, so a failing run never leaves partial output behind. Returns the
/// number of documents written.
pub fn run_with_config(config: &UnrollConfig) -> anyhow::Result<usize> {
    let options = config.unroll_options();
    log::info!(
        "Rewriting {} -> {} (mode: {}, class marker: {})",
        config.input.display(),
        config.output.display(),
        options.mode,
        options.class_marker
    );

    let documents = drdl::load_documents(&config.input)
        .with_context(|| format!("loading {}", config.input.display()))?;
    log::debug!(
        "Loaded {} document(s) from {}",
        documents.len(),
        config.input.display()
    );

    let rewritten = unroll::rewrite_documents(documents, &options)
        .with_context(|| format!("rewriting {}", config.input.display()))?;

    drdl::save_documents(&config.output, &rewritten)
        .with_context(|| format!("writing {}", config.output.display()))?;
    log::info!(
        "Wrote {} document(s) to {}",
        rewritten.len(),
        config.output.display()
    );
    Ok(rewritten.len())
}

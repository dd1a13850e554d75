//! Result and checkpoint directory layout
//!
//! ```text
//! root
//!  └── dataset
//!       └── model
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::Result;

/// Ensure `root/dataset/model` exists for every combination of the inputs.
///
/// Missing intermediate directories are created; existing ones are left
/// untouched, so repeated calls are no-ops.
///
/// # Errors
///
/// Returns an error if a directory cannot be created (e.g. permissions, or a
/// regular file sitting where a directory is expected).
pub fn create_folders<D, M, R>(datasets: &[D], models: &[M], roots: &[R]) -> Result<()>
where
    D: AsRef<str>,
    M: AsRef<str>,
    R: AsRef<Path>,
{
    for root in roots {
        for dataset in datasets {
            let base = root.as_ref().join(dataset.as_ref());
            if !base.is_dir() {
                debug!(path = %base.display(), "creating dataset folder");
                fs::create_dir_all(&base)?;
            }
            for model in models {
                let full = base.join(model.as_ref());
                if !full.is_dir() {
                    debug!(path = %full.display(), "creating model folder");
                    fs::create_dir_all(&full)?;
                }
            }
        }
    }
    Ok(())
}

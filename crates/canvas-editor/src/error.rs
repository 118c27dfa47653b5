use canvas_core::{ElementPath, ModelError};
use thiserror::Error;

/// Failure while applying a command to the editor state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("no element at {0}")]
    ElementNotFound(ElementPath),
    #[error("cannot reparent {moved} into its own descendant {target}")]
    CyclicReparent {
        moved: ElementPath,
        target: ElementPath,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

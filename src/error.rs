use thiserror::Error;

use crate::document::{BlockPath, ListKind};

/// A step could not be applied to the working document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("no block at {0}")]
    MissingBlock(BlockPath),
    #[error("block at {0} has no inline content")]
    NotTextblock(BlockPath),
    #[error("block at {0} is not a list item")]
    NotListItem(BlockPath),
    #[error("block at {0} cannot be lifted out of its container")]
    CannotLift(BlockPath),
    #[error("offset {offset} is out of range at {path}")]
    OffsetOutOfRange { path: BlockPath, offset: usize },
}

/// Failure of a list conversion command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("list kind `{0}` is not registered as a text block")]
    UnregisteredListKind(ListKind),
    #[error("cannot convert block at {0} into a list item here")]
    ConversionBlocked(BlockPath),
    #[error(transparent)]
    Step(#[from] StepError),
}

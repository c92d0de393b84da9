#![forbid(unsafe_code)]

mod collector;
mod conditional;
mod context;
mod directives;
mod emitter;
mod error;
mod key;
mod merge;
mod options;
mod printer;
mod rewriter;
mod utils;

pub use error::{Result, RewriteError};
pub use options::RewriterOptions;
pub use printer::{print_document, print_operation, print_selection_set};
pub use rewriter::{DocumentRewriter, RewrittenOperation};
pub use utils::get_operation;

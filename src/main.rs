//! # orderly CLI
//!
//! Command-line interface for the file inventory engine.
//!
//! ## Usage
//! ```bash
//! orderly scan ~/Downloads
//! orderly dupes --resolve rename
//! orderly organize ~/Downloads --apply
//! ```

mod cli;

use orderly::Result;

fn main() -> Result<()> {
    orderly::init_tracing();
    cli::run()
}

//! Supporting utilities: output file handling, progress bars and
//! cooperative cancellation.

pub mod cancel;
pub mod fs;
pub mod progress;

pub use cancel::CancellationFlag;
pub use fs::{atomic_write, check_path_length, ensure_dir, sanitize_file_stem, write_output};
pub use progress::ProgressBar;

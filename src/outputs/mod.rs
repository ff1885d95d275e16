//! Output generation for archived episodes.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 2023-12-30_朝の話.md
//! ├── 2023-12-31_QA_Whats_New.md
//! └── ...
//! ```

pub mod markdown;

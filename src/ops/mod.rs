//! Stream transformations over vector files.
//!
//! | operation   | passes | memory             |
//! |-------------|--------|--------------------|
//! | `describe`  | 0      | preamble only      |
//! | `cut`       | 1      | one row            |
//! | `join`      | 1      | one row per input  |
//! | `shuffle`   | 1      | whole file         |
//! | `split`     | 2      | qid list           |
//! | `normalize` | 2      | per-qid ranges     |
//!
//! Every operation writes to an explicit sink and reports rows to a
//! [`RowObserver`](crate::observe::RowObserver).

pub mod cut;
pub mod describe;
pub mod join;
pub mod normalize;
pub mod shuffle;
pub mod split;

pub use cut::{CutOptions, FieldList, cut};
pub use describe::describe;
pub use join::join;
pub use normalize::{NormalizeMethod, NormalizeOptions, ZeroRangePolicy, normalize};
pub use shuffle::{ShuffleOptions, shuffle};
pub use split::{FoldAssignment, FoldRole, FoldWriters, SplitOptions, fold_path, split, split_files};

pub mod util;

pub use util::{run_label, split_csv};

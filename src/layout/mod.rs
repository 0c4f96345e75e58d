pub(crate) mod cells;
pub(crate) mod config;
pub(crate) mod fit;

pub(crate) mod generate;
pub(crate) mod model;
pub(crate) mod plan;

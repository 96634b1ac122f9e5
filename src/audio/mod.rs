pub(crate) mod decode;
pub(crate) mod graph;
pub(crate) mod mix;

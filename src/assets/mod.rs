pub(crate) mod fetch;
pub(crate) mod media;
pub(crate) mod resolve;

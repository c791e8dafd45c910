pub(crate) mod engine;
pub(crate) mod resolver;
pub(crate) mod state;

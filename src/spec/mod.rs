pub(crate) mod defaults;
pub(crate) mod loader;
pub(crate) mod model;

pub(crate) mod backend;
pub(crate) mod display_list;
pub(crate) mod element;
pub(crate) mod elements;
pub(crate) mod pipeline;

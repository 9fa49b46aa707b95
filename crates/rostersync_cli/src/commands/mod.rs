pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod roster;
pub(crate) mod sync;

pub mod commands;
pub mod dict_source;
pub mod lattice;
pub mod session;
pub mod trace_init;

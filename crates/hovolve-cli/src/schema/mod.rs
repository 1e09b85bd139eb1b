pub mod pilot_model;
pub mod trace;

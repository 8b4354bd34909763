pub mod env;
pub mod fakes;

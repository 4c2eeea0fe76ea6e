pub mod advisory;
pub mod ai;
pub mod produce;
pub mod trace;
pub mod utility;
pub mod utils;

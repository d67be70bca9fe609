pub mod coinflip;
pub mod delete;
pub mod recent;
pub mod submit;

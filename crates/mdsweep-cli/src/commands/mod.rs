pub mod list;
pub mod render;
pub mod run;
pub mod submit;
pub mod version;

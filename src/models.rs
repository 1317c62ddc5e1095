pub mod ai;
pub mod client;
pub mod import;
pub mod pdv;
pub mod product;
pub mod route;
pub mod task_template;
pub mod user;

pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod pdv_repo;
pub use pdv_repo::PdvRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod task_template_repo;
pub use task_template_repo::TaskTemplateRepository;
pub mod route_repo;
pub use route_repo::RouteRepository;
pub mod import_store;
pub use import_store::{ImportStore, PgImportStore};

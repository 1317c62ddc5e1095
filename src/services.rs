// src/services.rs

pub mod client_service;
pub use client_service::ClientService;

pub mod pdv_service;
pub use pdv_service::PdvService;

pub mod user_service;
pub use user_service::UserService;

pub mod product_service;
pub use product_service::ProductService;

pub mod task_template_service;
pub use task_template_service::TaskTemplateService;

pub mod route_service;
pub use route_service::RouteService;

pub mod vision_service;
pub use vision_service::VisionService;

pub mod import;
pub use import::ImportService;

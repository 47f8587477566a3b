pub mod collection_service;
pub mod deadline;
pub mod material_service;
pub mod progress_service;
pub mod user_service;

pub use collection_service::CollectionService;
pub use material_service::MaterialService;
pub use progress_service::ProgressService;
pub use user_service::UserService;

pub mod collection_repository;
pub mod material_repository;
pub mod membership_repository;
pub mod progress_repository;
pub mod user_repository;

pub use collection_repository::{CollectionRepository, MongoCollectionRepository};
pub use material_repository::{MaterialRepository, MongoMaterialRepository};
pub use membership_repository::{MembershipRepository, MongoMembershipRepository};
pub use progress_repository::{MongoProgressRepository, ProgressRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

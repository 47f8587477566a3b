pub mod collection;
pub mod material;
pub mod progress;
pub mod user;
pub use collection::Collection;
pub use material::{Material, MaterialType};
pub use progress::{CompletionRecord, Membership, Subscription, XpTotals};
pub use user::User;

pub mod card_items;
pub mod cards;
pub mod users;

pub use card_items::Entity as CardItems;
pub use card_items::Model as CardItemRow;
pub use cards::Entity as Cards;
pub use cards::Model as CardRow;
pub use users::Entity as Users;
pub use users::Model as User;

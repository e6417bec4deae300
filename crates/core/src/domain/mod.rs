pub mod conversation;
pub mod decision;
pub mod knowledge;
pub mod professional;
pub mod slots;

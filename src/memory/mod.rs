pub mod kalloc;
pub mod layout;

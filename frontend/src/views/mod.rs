pub mod global_note;
pub mod manager_view;
pub mod staff_view;

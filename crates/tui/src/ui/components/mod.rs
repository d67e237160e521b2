pub mod hints;
pub mod list_panel;
pub mod tabs;
pub mod toast;

pub mod console_view;

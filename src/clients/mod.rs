pub mod habbo;

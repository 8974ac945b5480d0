pub mod axis;
pub mod bus;
pub mod console;
pub mod module;
pub mod protocol;
pub mod registry;
pub mod switch;

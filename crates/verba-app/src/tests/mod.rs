mod handler_tests;
mod select_tests;

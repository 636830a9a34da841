mod common;
mod workspace_tests;

pub mod audit;
pub mod info;
pub mod install;
pub mod list;
pub mod smoke_test;
pub mod uninstall;

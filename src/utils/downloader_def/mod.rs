pub mod downloader;
pub mod providers;
pub mod r#trait;

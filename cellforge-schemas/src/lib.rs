pub mod compartment;
pub mod config;
pub mod file_formats;
pub mod metabolite;
pub mod result;
pub mod snapshot;

pub mod http_in;

pub use http_in::{Credentials, HttpSource};

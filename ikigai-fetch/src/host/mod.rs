//! Host APIs for system interactions.

pub mod http;

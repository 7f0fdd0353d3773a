//! Payload sniffing module
//!
//! This module inspects TCP payload views for application-layer hints,
//! currently limited to extracting the `Host` header from plain-HTTP
//! request segments.
//!
//! # Example
//!
//! ```
//! use hostblock::sniff::extract_host;
//!
//! let payload = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! if let Some(host) = extract_host(payload) {
//!     println!("HTTP request to: {host}");
//! }
//! ```

mod http;

pub use http::extract_host;

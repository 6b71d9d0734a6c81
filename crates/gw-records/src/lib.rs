//! `gw-records` — the pipeline's only wire/file format.
//!
//! Every persisted artifact (junction tables, polyline streams, signal
//! words, position frames, congestion counts) is a line-oriented list of
//! fixed-width hexadecimal tokens:
//!
//! ```text
//! memory_initialization_radix=16;
//! memory_initialization_vector=
//! 3F08A,
//! 3F0C2,
//! 0A011;
//! ```
//!
//! One token per logical record, newline-separated, semicolon on the last.
//!
//! # Modules
//!
//! | Module     | Contents                                             |
//! |------------|------------------------------------------------------|
//! | [`reader`] | Best-effort tokenizer (`RecordScan`)                 |
//! | [`words`]  | Bit-level pack/unpack for each record kind           |
//! | [`writer`] | Buffered writer producing the header + vector layout |
//!
//! # Error policy
//!
//! Reading is best-effort: header keywords are recognized, `0x` prefixes
//! stripped, and non-hex tokens skipped and counted rather than failing the
//! parse.  Only I/O failures surface as [`RecordError`].

pub mod reader;
pub mod words;
pub mod writer;

mod error;


pub use error::{RecordError, RecordResult};
pub use reader::{RecordScan, scan_path, scan_str};
pub use words::{FrameFields, PolylinePoint, TokenWidth};
pub use writer::RecordWriter;

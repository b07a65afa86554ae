//! Binary clip format.
//!
//! All multi-byte values are little-endian; strings are a 7-bit variable
//! length prefix followed by UTF-8 bytes.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------------+
//! | Name                       |  string
//! | Duration                   |  f32
//! | Part count                 |  i32
//! +----------------------------+
//! | Event count                |  i32
//! | { save-string, time f32 }* |
//! +----------------------------+
//! | Parts (part count times)   |
//! |   path                     |  string
//! |   parent index             |  i16, negative = root
//! |   has custom name [+ name] |  bool [+ string]
//! |   has texture [+ path]     |  bool [+ string]
//! |   transparent by default   |  bool
//! +----------------------------+
//! | Curve count                |  i32
//! | { group u8, field u8,      |
//! |   part u8, curve body }*   |
//! +----------------------------+
//! | Per part: default count u8 |
//! | { group u8, field u8,      |
//! |   value f32 }*             |
//! +----------------------------+
//! ```
//!
//! A curve body is a pre-wrap byte, a post-wrap byte, an `i32` key count and
//! per key six `f32` (time, value, in/out tangent, in/out weight) plus a
//! weighted-mode byte.

mod format;
mod read_util;
mod reader;
mod writer;

pub use format::*;
pub use read_util::*;
pub use reader::*;
pub use writer::*;

//! Kestrel runtime library.
//!
//! Provides the native runtime functions required by Kestrel's compiled
//! output:
//! - Primitive I/O (`printInt`, `printString`, `readInt`, `readString`)
//! - String support (`__concat`, `__strEq`, `__freeString`)
//! - The fatal-error trap (`error`)
//! - Leak diagnostics (`__lsan_init`, `__lsan_report`)
//!
//! The exported symbol names are the linkage contract with generated code
//! and never change. Rust-side items are snake_case, bound to their symbols
//! with `export_name`.
//!
//! Apart from the static empty-string sentinel, the runtime keeps no
//! reference to anything it returns: every heap string crossing the FFI is
//! exclusively owned by the caller until it comes back through
//! `__freeString`.

pub mod io;
pub mod lsan;
pub mod memory;
pub mod string;
pub mod trap;

pub use io::{print_int, print_string, read_int, read_string};
pub use lsan::{lsan_init, lsan_report};
pub use memory::free_string;
pub use string::{concat, str_eq};
pub use trap::error;

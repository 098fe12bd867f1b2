pub mod companion;
pub mod header;

// Re-export main public functions
pub use companion::{render_table, verify_patched, CompanionModule, PatchError, RenderedTable};
pub use header::{emit_enum, emit_header, parse_header_defines};

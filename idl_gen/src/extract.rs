/* Enum extraction from a parsed declaration list */

use idl_types::{Declaration, EnumDecl};
use std::collections::HashMap;
use tracing::{debug, warn};

/* Enumerations in source order, values verbatim. `includes` statements and all other kinds are skipped.
 * A re-declared enum keeps its first position and takes the values of its last declaration. */
pub fn extract_enums(declarations: &[Declaration]) -> Vec<EnumDecl> {
    let mut enums: Vec<EnumDecl> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for decl in declarations {
        if decl.is_includes() {
            continue;
        }
        let Some(enum_decl) = decl.as_enum() else {
            continue;
        };
        match positions.get(enum_decl.name.as_str()) {
            Some(&index) => {
                warn!(name = %enum_decl.name, "enum declared more than once, last declaration wins");
                enums[index].values = enum_decl.values.clone();
            }
            None => {
                positions.insert(&enum_decl.name, enums.len());
                enums.push(enum_decl.clone());
            }
        }
        debug!(name = %enum_decl.name, values = enum_decl.values.len(), "extracted enum");
    }
    enums
}

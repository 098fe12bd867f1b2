/* Binding enums to constant definitions
 *
 * Each declared value is interned at the moment it is visited, so the codes
 * are a pure function of the (enum, value) visitation order.
 */

use crate::error::GenerateResult;
use crate::mangle::{invalid_identifier, mangle, type_identifier, IdentifierRegistry, Origin, Role};
use crate::strings::{StringTable, SENTINEL_INDEX};
use idl_types::EnumDecl;
use serde_derive::Serialize;
use tracing::debug;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConstantDefinition {
    pub identifier: String,
    pub code: usize,
}

/* One enum with its type identifier and constants. The invalid constant comes first. */
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EnumBinding {
    pub name: String,
    pub type_identifier: String,
    pub constants: Vec<ConstantDefinition>,
}

impl EnumBinding {
    pub fn invalid(&self) -> Option<&ConstantDefinition> {
        self.constants.first()
    }

    /* Constants for the declared values, without the invalid constant */
    pub fn values(&self) -> &[ConstantDefinition] {
        self.constants.get(1..).unwrap_or_default()
    }
}

/* Bind one enum, interning its values into `table` */
pub fn bind_enum(
    decl: &EnumDecl,
    table: &mut StringTable,
    registry: &mut IdentifierRegistry,
) -> GenerateResult<EnumBinding> {
    let type_ident = type_identifier(&decl.name);
    registry.register(&type_ident, Origin::new(&decl.name, Role::Type))?;

    let invalid = invalid_identifier(&decl.name);
    registry.register(&invalid, Origin::new(&decl.name, Role::Invalid))?;

    let mut constants = Vec::with_capacity(decl.values.len() + 1);
    constants.push(ConstantDefinition {
        identifier: invalid,
        code: SENTINEL_INDEX,
    });

    for value in &decl.values {
        let identifier = mangle(&decl.name, value);
        registry.register(&identifier, Origin::new(&decl.name, Role::Value(value.clone())))?;
        let code = table.intern_or_lookup(value);
        constants.push(ConstantDefinition { identifier, code });
    }

    debug!(name = %decl.name, constants = constants.len(), table_len = table.len(), "bound enum");
    Ok(EnumBinding {
        name: decl.name.clone(),
        type_identifier: type_ident,
        constants,
    })
}

/* Bind every enum in extraction order against one shared table */
pub fn bind_enums(enums: &[EnumDecl], table: &mut StringTable) -> GenerateResult<Vec<EnumBinding>> {
    let mut registry = IdentifierRegistry::new();
    enums
        .iter()
        .map(|decl| bind_enum(decl, table, &mut registry))
        .collect()
}

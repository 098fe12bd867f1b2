/* In-memory generation pass: extract -> bind (mangle + intern) */

use crate::bind::{bind_enums, EnumBinding};
use crate::codegen::{emit_header, render_table, RenderedTable};
use crate::error::GenerateResult;
use crate::extract::extract_enums;
use crate::strings::StringTable;
use idl_types::{Declaration, EnumDecl};
use serde_derive::Serialize;

/* Everything derived from one declaration list */
#[derive(Debug, Clone)]
pub struct Generation {
    pub enums: Vec<EnumDecl>,
    pub bindings: Vec<EnumBinding>,
    pub table: StringTable,
}

impl Generation {
    pub fn header(&self) -> String {
        emit_header(&self.bindings)
    }

    pub fn rendered_table(&self) -> RenderedTable {
        render_table(&self.table)
    }

    pub fn report(&self) -> GenerationReport<'_> {
        GenerationReport {
            enums: &self.bindings,
            strings: self.table.iter().collect(),
        }
    }
}

/* Serializable summary printed by `analyze` */
#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct GenerationReport<'a> {
    pub enums: &'a [EnumBinding],
    pub strings: Vec<&'a str>,
}

pub fn generate(declarations: &[Declaration]) -> GenerateResult<Generation> {
    let enums = extract_enums(declarations);
    let mut table = StringTable::new();
    let bindings = bind_enums(&enums, &mut table)?;
    Ok(Generation {
        enums,
        bindings,
        table,
    })
}

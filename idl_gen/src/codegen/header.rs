/* C header emission: one typedef and a block of #defines per enum */

use crate::bind::EnumBinding;

pub const HEADER_PREAMBLE: &str = "#pragma once\n\n";
pub const TYPE_DECL: &str = "typedef int";
pub const DEFINE: &str = "#define";

/* Render the full header. Output depends only on `bindings`. */
pub fn emit_header(bindings: &[EnumBinding]) -> String {
    let mut output = String::from(HEADER_PREAMBLE);
    for binding in bindings {
        output.push_str(&emit_enum(binding));
    }
    output
}

/* Render one enum block, blank separator line included */
pub fn emit_enum(binding: &EnumBinding) -> String {
    let mut output = format!("{} {};\n", TYPE_DECL, binding.type_identifier);
    for constant in &binding.constants {
        output.push_str(&format!("{} {} {}\n", DEFINE, constant.identifier, constant.code));
    }
    output.push('\n');
    output
}

/* Read `#define NAME CODE` lines back out of header text, in order */
pub fn parse_header_defines(header: &str) -> Vec<(String, usize)> {
    header
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix(DEFINE)?.strip_prefix(' ')?;
            let (name, code) = rest.split_once(' ')?;
            Some((name.to_string(), code.trim().parse::<usize>().ok()?))
        })
        .collect()
}

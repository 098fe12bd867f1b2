use serde_derive::{Deserialize, Serialize};

/* An enumeration declaration: `enum Name { "a", "b" };` */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDecl {
    pub name: String,
    /* Value literals in declared order, unescaped, duplicates kept */
    pub values: Vec<String>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub inherits: Option<String>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub mixin: bool,
    #[serde(default)]
    pub callback: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DictionaryDecl {
    pub name: String,
    #[serde(default)]
    pub inherits: Option<String>,
    #[serde(default)]
    pub partial: bool,
}

/* `Target includes Mixin;` */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct IncludesDecl {
    pub target: String,
    pub mixin: String,
}

/* One top-level IDL statement, in source order */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Declaration {
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    Dictionary(DictionaryDecl),
    Namespace { name: String, partial: bool },
    Typedef { name: String },
    Callback { name: String },
    Includes(IncludesDecl),
}

impl Declaration {
    /* Name the declaration introduces. `includes` statements report their target. */
    pub fn name(&self) -> &str {
        match self {
            Declaration::Enum(e) => &e.name,
            Declaration::Interface(i) => &i.name,
            Declaration::Dictionary(d) => &d.name,
            Declaration::Namespace { name, .. } => name,
            Declaration::Typedef { name } => name,
            Declaration::Callback { name } => name,
            Declaration::Includes(inc) => &inc.target,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Declaration::Enum(_) => "enum",
            Declaration::Interface(i) if i.mixin => "interface mixin",
            Declaration::Interface(i) if i.callback => "callback interface",
            Declaration::Interface(_) => "interface",
            Declaration::Dictionary(_) => "dictionary",
            Declaration::Namespace { .. } => "namespace",
            Declaration::Typedef { .. } => "typedef",
            Declaration::Callback { .. } => "callback",
            Declaration::Includes(_) => "includes",
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match self {
            Declaration::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_includes(&self) -> bool {
        matches!(self, Declaration::Includes(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_reports_target_as_name() {
        let decl = Declaration::Includes(IncludesDecl {
            target: "GPUDevice".to_string(),
            mixin: "GPUObjectBase".to_string(),
        });
        assert_eq!(decl.name(), "GPUDevice");
        assert_eq!(decl.kind_str(), "includes");
        assert!(decl.is_includes());
        assert!(decl.as_enum().is_none());
    }

    #[test]
    fn interface_kind_reflects_flags() {
        let mixin = Declaration::Interface(InterfaceDecl {
            name: "GPUObjectBase".to_string(),
            inherits: None,
            partial: false,
            mixin: true,
            callback: false,
        });
        assert_eq!(mixin.kind_str(), "interface mixin");
    }
}

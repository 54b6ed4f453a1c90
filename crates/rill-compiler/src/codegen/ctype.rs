//! C type representation and declarator rendering.
//!
//! A [`CType`] is the base type name plus a chain of pointer/array modifiers
//! and an optional function-pointer parameter list. Rendering follows C's
//! inside-out declarator rule: qualifiers, then the type name, then stars
//! (each with its own `const`), then the identifier, then array extents,
//! then the parameter list.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CTypeMod {
    Ptr { is_const: bool },
    Arr(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CType {
    modifiers: Vec<CTypeMod>,
    /// Present on function-pointer types.
    params: Option<Vec<CType>>,
    pub is_const: bool,
    pub is_volatile: bool,
    name: String,
}

impl CType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_ptr(&mut self, is_const: bool) {
        self.modifiers.push(CTypeMod::Ptr { is_const });
    }

    pub fn add_arr(&mut self, size: u64) {
        self.modifiers.push(CTypeMod::Arr(size));
    }

    /// Turns this into a function-pointer type over `params`.
    pub fn make_fn_ptr(&mut self, params: Vec<CType>) {
        self.params = Some(params);
    }

    pub fn is_fn_ptr(&self) -> bool {
        self.params.is_some()
    }

    /// Renders the declarator, with `name` as the declared identifier (or
    /// nothing, for abstract declarators such as parameter types).
    pub fn render(&self, name: Option<&str>) -> String {
        let mut out = String::new();

        if self.is_const {
            out.push_str("const ");
        }
        if self.is_volatile {
            out.push_str("volatile ");
        }
        out.push_str(&self.name);
        out.push(' ');

        if self.params.is_some() {
            out.push('(');
        }

        for modifier in &self.modifiers {
            if let CTypeMod::Ptr { is_const } = modifier {
                out.push('*');
                if *is_const {
                    out.push_str("const ");
                }
            }
        }

        if let Some(name) = name {
            out.push_str(name);
        }

        for modifier in &self.modifiers {
            if let CTypeMod::Arr(size) = modifier {
                out.push('[');
                out.push_str(&size.to_string());
                out.push(']');
            }
        }

        if let Some(params) = &self.params {
            out.push(')');
            out.push('(');
            if params.is_empty() {
                out.push_str("void");
            }
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(param.render(None).trim_end());
            }
            out.push(')');
        }

        // abstract declarators end after the stars; drop the dangling space
        if name.is_none() && self.params.is_none() {
            while out.ends_with(' ') {
                out.pop();
            }
        }

        out
    }
}

//! The deferred build stream.
//!
//! `emit_*` calls append nodes to a stack; nothing is rendered until
//! [`CodeBuilder::get_generated`] walks the stack once and produces the
//! output text, consuming the stream. Separating building from emission
//! lets any back-end ingest the same stream.
//!
//! Contracts:
//! - identifiers attach to the innermost open scope and are refused when
//!   they collide with an output-language reserved word
//! - `Scope`/`ScopeEnd` are strictly balanced
//! - an `Expression` template consumes one following stream node per `$`
//! - a `Call` consumes as many following nodes as its argument count

use std::collections::HashSet;

use super::ctype::CType;

/// The 60 reserved words of the output language. Identifiers colliding with
/// any of these are refused.
const RESERVED_WORDS: [&str; 60] = [
    "alignas",
    "alignof",
    "auto",
    "bool",
    "break",
    "case",
    "char",
    "const",
    "constexpr",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extern",
    "false",
    "float",
    "for",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "nullptr",
    "register",
    "restrict",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "struct",
    "switch",
    "thread_local",
    "true",
    "typedef",
    "typeof",
    "typeof_unqual",
    "union",
    "unsigned",
    "void",
    "volatile",
    "while",
    "_Alignas",
    "_Alignof",
    "_Atomic",
    "_BitInt",
    "_Bool",
    "_Complex",
    "_Decimal128",
    "_Decimal32",
    "_Decimal64",
    "_Generic",
    "_Imaginary",
    "_Noreturn",
    "_Static_assert",
    "_Thread_local",
    "NULL",
];

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("identifier '{0}' is a reserved word")]
    ReservedWord(String),
    #[error("no active scope for identifier '{0}'")]
    NoActiveScope(String),
    #[error("scope end without an open scope")]
    UnbalancedScope,
    #[error("scope does not have an end")]
    UnclosedScope,
    #[error("stream ended while consuming placeholders")]
    ExhaustedStream,
}

/// A declared identifier: name plus full C type.
#[derive(Debug, Clone)]
pub struct CIdent {
    pub name: String,
    pub ty: CType,
    pub is_static: bool,
    pub is_extern: bool,
}

#[derive(Debug, Clone)]
struct ScopeNode {
    parent: Option<usize>,
    idents: Vec<CIdent>,
}

#[derive(Debug, Clone)]
struct FunctionNode {
    name: String,
    ret: CType,
    params: Vec<CIdent>,
    is_static: bool,
}

#[derive(Debug, Clone)]
enum StreamNode {
    // kept for back-ends that stream loose declarations; scopes attach
    // their identifiers directly
    #[allow(dead_code)]
    Identifier(CIdent),
    Scope(ScopeNode),
    ScopeEnd,
    Statement,
    Function(FunctionNode),
    Call { name: String, argc: u32 },
    Expression(String),
}

const INDENT: &str = "    ";

/// Deferred stream builder. The reserved-word set travels with the builder;
/// there is no process-wide state.
#[derive(Debug)]
pub struct CodeBuilder {
    stream: Vec<StreamNode>,
    active_scope: Option<usize>,
    reserved: HashSet<&'static str>,
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self {
            stream: Vec::new(),
            active_scope: None,
            reserved: RESERVED_WORDS.into_iter().collect(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    pub fn emit_scope(&mut self) {
        let parent = self.active_scope;
        self.stream.push(StreamNode::Scope(ScopeNode {
            parent,
            idents: Vec::new(),
        }));
        self.active_scope = Some(self.stream.len() - 1);
    }

    pub fn emit_scope_end(&mut self) -> Result<(), BuildError> {
        let Some(active) = self.active_scope else {
            return Err(BuildError::UnbalancedScope);
        };
        self.stream.push(StreamNode::ScopeEnd);

        let StreamNode::Scope(scope) = &self.stream[active] else {
            unreachable!("active_scope always indexes a scope node");
        };
        self.active_scope = scope.parent;
        Ok(())
    }

    pub fn emit_statement(&mut self) {
        self.stream.push(StreamNode::Statement);
    }

    /// Attaches a declaration to the innermost open scope.
    pub fn emit_identifier(
        &mut self,
        name: &str,
        ty: CType,
        is_static: bool,
        is_extern: bool,
    ) -> Result<(), BuildError> {
        if self.is_reserved(name) {
            return Err(BuildError::ReservedWord(name.to_owned()));
        }
        let Some(active) = self.active_scope else {
            return Err(BuildError::NoActiveScope(name.to_owned()));
        };

        let StreamNode::Scope(scope) = &mut self.stream[active] else {
            unreachable!("active_scope always indexes a scope node");
        };
        scope.idents.push(CIdent {
            name: name.to_owned(),
            ty,
            is_static,
            is_extern,
        });
        Ok(())
    }

    /// Begins a function definition and opens its body scope.
    pub fn emit_function(
        &mut self,
        name: &str,
        is_static: bool,
        ret: CType,
        params: Vec<CIdent>,
    ) -> Result<(), BuildError> {
        if self.is_reserved(name) {
            return Err(BuildError::ReservedWord(name.to_owned()));
        }
        self.stream.push(StreamNode::Function(FunctionNode {
            name: name.to_owned(),
            ret,
            params,
            is_static,
        }));
        self.emit_scope();
        Ok(())
    }

    /// A call by name; rendering consumes the next `argc` stream nodes as
    /// arguments.
    pub fn emit_call(&mut self, name: &str, argc: u32) {
        self.stream.push(StreamNode::Call {
            name: name.to_owned(),
            argc,
        });
    }

    /// A template; each `$` consumes the next stream node when rendered.
    pub fn emit_expression(&mut self, template: impl Into<String>) {
        self.stream.push(StreamNode::Expression(template.into()));
    }

    /// A string literal atom, quoted and escaped for the output language.
    pub fn emit_atomic(&mut self, text: &str) {
        let mut quoted = String::with_capacity(text.len() + 2);
        quoted.push('"');
        for ch in text.chars() {
            match ch {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\t' => quoted.push_str("\\t"),
                '\r' => quoted.push_str("\\r"),
                _ => quoted.push(ch),
            }
        }
        quoted.push('"');
        self.stream.push(StreamNode::Expression(quoted));
    }

    pub fn emit_retval(&mut self, value: i64) {
        self.emit_expression(format!("return {value}"));
        self.emit_statement();
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// Walks the stream once and renders the output text. The builder is
    /// empty afterwards.
    pub fn get_generated(&mut self) -> Result<String, BuildError> {
        let stream = std::mem::take(&mut self.stream);
        self.active_scope = None;

        let mut walker = Generator {
            stream,
            cursor: 0,
            out: String::new(),
            indent: 0,
        };
        while walker.cursor < walker.stream.len() {
            let node = walker.consume()?;
            walker.generate(node)?;
        }
        Ok(walker.out)
    }
}

struct Generator {
    stream: Vec<StreamNode>,
    cursor: usize,
    out: String,
    indent: usize,
}

impl Generator {
    fn consume(&mut self) -> Result<StreamNode, BuildError> {
        let node = self
            .stream
            .get(self.cursor)
            .cloned()
            .ok_or(BuildError::ExhaustedStream)?;
        self.cursor += 1;
        Ok(node)
    }

    /// Re-indents the current line: strips trailing whitespace back to the
    /// last newline, then writes the current level.
    fn indent_line(&mut self) {
        while self.out.ends_with(|c: char| c == ' ' || c == '\t') {
            self.out.pop();
        }
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn generate(&mut self, node: StreamNode) -> Result<(), BuildError> {
        match node {
            StreamNode::Function(func) => self.function(func),
            StreamNode::Scope(scope) => self.scope(scope),
            StreamNode::ScopeEnd => Err(BuildError::UnbalancedScope),
            StreamNode::Statement => {
                self.statement();
                Ok(())
            }
            StreamNode::Identifier(ident) => {
                self.identifier(&ident);
                Ok(())
            }
            StreamNode::Call { name, argc } => self.call(&name, argc),
            StreamNode::Expression(template) => self.expression(&template),
        }
    }

    fn statement(&mut self) {
        self.out.push_str(";\n");
        self.indent_line();
    }

    fn identifier(&mut self, ident: &CIdent) {
        if ident.is_static {
            self.out.push_str("static ");
        }
        if ident.is_extern {
            self.out.push_str("extern ");
        }
        self.out.push_str(&ident.ty.render(Some(&ident.name)));
    }

    fn scope(&mut self, scope: ScopeNode) -> Result<(), BuildError> {
        self.out.push_str(" {\n");
        self.indent += 1;
        self.indent_line();

        for ident in &scope.idents {
            self.identifier(ident);
            self.statement();
        }

        loop {
            match self.stream.get(self.cursor) {
                Some(StreamNode::ScopeEnd) => {
                    self.cursor += 1;
                    break;
                }
                Some(_) => {
                    let node = self.consume()?;
                    self.generate(node)?;
                }
                None => return Err(BuildError::UnclosedScope),
            }
        }

        self.indent -= 1;
        self.indent_line();
        self.out.push_str("}\n");
        self.indent_line();
        Ok(())
    }

    fn function(&mut self, func: FunctionNode) -> Result<(), BuildError> {
        if func.is_static {
            self.out.push_str("static ");
        }

        let mut declarator = String::from(func.name);
        declarator.push('(');
        if func.params.is_empty() {
            declarator.push_str("void");
        }
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                declarator.push_str(", ");
            }
            declarator.push_str(param.ty.render(Some(&param.name)).trim_end());
        }
        declarator.push(')');

        self.out.push_str(&func.ret.render(Some(&declarator)));
        Ok(())
    }

    fn call(&mut self, name: &str, argc: u32) -> Result<(), BuildError> {
        self.out.push_str(name);
        self.out.push('(');
        for i in 0..argc {
            if i > 0 {
                self.out.push_str(", ");
            }
            let node = self.consume()?;
            self.generate(node)?;
        }
        self.out.push(')');
        Ok(())
    }

    fn expression(&mut self, template: &str) -> Result<(), BuildError> {
        for ch in template.chars() {
            if ch == '$' {
                let node = self.consume()?;
                self.generate(node)?;
            } else {
                self.out.push(ch);
            }
        }
        Ok(())
    }
}

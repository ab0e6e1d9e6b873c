use std::rc::Rc;

use tracing::trace;

use skiff_thrift_schema::{
    EnumDef, FieldDef, Method, Module, ServiceDef, StructDef, StructKind, Symbol, TypeTag, Value,
};

use crate::cast::cast_value;
use crate::error::ThriftError;
use crate::loader::Loader;
use crate::tokenizer::{Keyword as Kw, Token, TokenKind};

/// Single-pass parser over a token stream. Each production's action runs as
/// soon as the production completes, so every definition is visible to the
/// statements after it; there is no separate analysis pass and no AST.
pub(crate) struct Parser<'t, 'l> {
    tokens: &'t [Token],
    index: usize,
    module: Module,
    loader: &'l mut Loader,
}

impl<'t, 'l> Parser<'t, 'l> {
    pub(crate) fn new(tokens: &'t [Token], module: Module, loader: &'l mut Loader) -> Self {
        Parser {
            tokens,
            index: 0,
            module,
            loader,
        }
    }

    pub(crate) fn parse_document(mut self) -> Result<Module, ThriftError> {
        self.parse_header()?;
        self.parse_definitions()?;
        Ok(self.module)
    }

    // ---- token plumbing ----

    fn peek(&self) -> &Token {
        // the token list always ends with Eof and the index never passes it
        &self.tokens[self.index]
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn at_ident(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.index += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> ThriftError {
        let token = self.peek();
        ThriftError::Grammar {
            expected: expected.to_owned(),
            found: token.kind.describe(),
            line: token.line,
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if matches!(self.peek().kind, TokenKind::Punct(p) if p == c) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ThriftError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{:?}", c)))
        }
    }

    fn eat_kw(&mut self, kw: Kw) -> bool {
        if matches!(self.peek().kind, TokenKind::Kw(k) if k == kw) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// At most one `,` or `;` between list items; none is fine too.
    fn eat_sep(&mut self) {
        let _ = self.eat_punct(',') || self.eat_punct(';');
    }

    fn expect_ident(&mut self) -> Result<(String, usize), ThriftError> {
        match &self.tokens[self.index].kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let line = self.tokens[self.index].line;
                self.index += 1;
                Ok((name, line))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_int(&mut self) -> Result<(i64, usize), ThriftError> {
        match self.tokens[self.index].kind {
            TokenKind::Int(value) => {
                let line = self.tokens[self.index].line;
                self.index += 1;
                Ok((value, line))
            }
            _ => Err(self.unexpected("an integer")),
        }
    }

    fn expect_string(&mut self) -> Result<(String, usize), ThriftError> {
        match &self.tokens[self.index].kind {
            TokenKind::Str(value) => {
                let value = value.clone();
                let line = self.tokens[self.index].line;
                self.index += 1;
                Ok((value, line))
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }

    // ---- header ----

    fn parse_header(&mut self) -> Result<(), ThriftError> {
        loop {
            if self.eat_kw(Kw::Include) {
                self.parse_include()?;
            } else if self.eat_kw(Kw::Namespace) {
                self.parse_namespace()?;
            } else {
                return Ok(());
            }
            self.eat_punct(';');
        }
    }

    fn parse_include(&mut self) -> Result<(), ThriftError> {
        let (relative, _) = self.expect_string()?;
        let path = self.loader.include_dir.join(relative);
        let child = self.loader.load(&path)?;
        let name = child.name.clone();
        trace!(module = %self.module.name, child = %name, "attaching included module");
        self.module.define(name, Symbol::Module(child));
        Ok(())
    }

    fn parse_namespace(&mut self) -> Result<(), ThriftError> {
        // scope is '*' or an identifier; the namespace itself has no effect
        // on the model
        if !self.eat_punct('*') {
            self.expect_ident()?;
        }
        self.expect_ident()?;
        Ok(())
    }

    // ---- definitions ----

    fn parse_definitions(&mut self) -> Result<(), ThriftError> {
        loop {
            if self.eat_kw(Kw::Const) {
                self.parse_const()?;
            } else if self.eat_kw(Kw::Typedef) {
                self.parse_typedef()?;
            } else if self.eat_kw(Kw::Enum) {
                self.parse_enum()?;
            } else if self.eat_kw(Kw::Struct) {
                self.parse_struct_like(StructKind::Struct)?;
            } else if self.eat_kw(Kw::Union) {
                self.parse_struct_like(StructKind::Union)?;
            } else if self.eat_kw(Kw::Exception) {
                self.parse_struct_like(StructKind::Exception)?;
            } else if self.eat_kw(Kw::Service) {
                self.parse_service()?;
            } else if self.at_eof() {
                return Ok(());
            } else {
                return Err(self.unexpected("a definition"));
            }
            self.eat_punct(';');
        }
    }

    fn parse_const(&mut self) -> Result<(), ThriftError> {
        let ty = self.parse_field_type()?;
        let (name, line) = self.expect_ident()?;
        self.expect_punct('=')?;
        let literal = self.parse_const_value()?;
        let value = cast_value(&ty, literal, line)?;
        self.module.define(name, Symbol::Const(value));
        Ok(())
    }

    fn parse_typedef(&mut self) -> Result<(), ThriftError> {
        let ty = self.parse_definition_type()?;
        let (name, _) = self.expect_ident()?;
        self.module.define(name, Symbol::Typedef(ty));
        Ok(())
    }

    fn parse_enum(&mut self) -> Result<(), ThriftError> {
        let (name, _) = self.expect_ident()?;
        self.expect_punct('{')?;
        let mut members = Vec::new();
        while !self.eat_punct('}') {
            let (member, _) = self.expect_ident()?;
            let explicit = if self.eat_punct('=') {
                Some(self.expect_int()?.0)
            } else {
                None
            };
            members.push((member, explicit));
            self.eat_sep();
        }
        let def = Rc::new(EnumDef::build(name.clone(), members));
        self.module.define(name, Symbol::Enum(def));
        Ok(())
    }

    fn parse_struct_like(&mut self, kind: StructKind) -> Result<(), ThriftError> {
        let (name, _) = self.expect_ident()?;
        self.expect_punct('{')?;
        let fields = self.parse_fields('}')?;
        let def = Rc::new(StructDef::new(name.clone(), kind, fields));
        self.module.define(name, Symbol::Struct(def));
        Ok(())
    }

    fn parse_fields(&mut self, closer: char) -> Result<Vec<FieldDef>, ThriftError> {
        let mut fields = Vec::new();
        while !self.eat_punct(closer) {
            fields.push(self.parse_field()?);
            self.eat_sep();
        }
        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<FieldDef, ThriftError> {
        let (raw_id, id_line) = self.expect_int()?;
        let id = i32::try_from(raw_id).map_err(|_| ThriftError::Grammar {
            expected: "a field id in i32 range".to_owned(),
            found: raw_id.to_string(),
            line: id_line,
        })?;
        self.expect_punct(':')?;

        // 'required' marks the field; 'optional' and no qualifier both mean
        // not required
        let required = self.eat_kw(Kw::Required);
        if !required {
            self.eat_kw(Kw::Optional);
        }

        let ty = self.parse_field_type()?;
        let (name, line) = self.expect_ident()?;
        let default = if self.eat_punct('=') {
            let literal = self.parse_const_value()?;
            Some(cast_value(&ty, literal, line)?)
        } else {
            None
        };

        Ok(FieldDef {
            id,
            required,
            ty,
            name,
            default,
        })
    }

    // ---- services ----

    fn parse_service(&mut self) -> Result<(), ThriftError> {
        let (name, _) = self.expect_ident()?;
        let extends = if self.eat_kw(Kw::Extends) {
            let (target, line) = self.expect_ident()?;
            Some(self.resolve_service(&name, &target, line)?)
        } else {
            None
        };
        self.expect_punct('{')?;
        let mut methods = Vec::new();
        while !self.eat_punct('}') {
            methods.push(self.parse_function()?);
            self.eat_sep();
        }
        let def = Rc::new(ServiceDef::new(name.clone(), extends, methods));
        self.module.define(name, Symbol::Service(def));
        Ok(())
    }

    fn parse_function(&mut self) -> Result<Method, ThriftError> {
        let oneway = self.eat_kw(Kw::Oneway);
        let return_ty = if self.eat_kw(Kw::Void) {
            None
        } else {
            Some(self.parse_field_type()?)
        };
        let (name, _) = self.expect_ident()?;
        self.expect_punct('(')?;
        let params = self.parse_fields(')')?;
        let throws = if self.eat_kw(Kw::Throws) {
            self.expect_punct('(')?;
            self.parse_fields(')')?
        } else {
            Vec::new()
        };
        Ok(Method::new(name, oneway, return_ty, params, throws))
    }

    // ---- types ----

    fn parse_field_type(&mut self) -> Result<TypeTag, ThriftError> {
        if self.at_ident() {
            let (path, line) = self.expect_ident()?;
            self.resolve_type(&path, line)
        } else {
            self.parse_definition_type()
        }
    }

    fn parse_definition_type(&mut self) -> Result<TypeTag, ThriftError> {
        if self.eat_kw(Kw::Bool) {
            Ok(TypeTag::Bool)
        } else if self.eat_kw(Kw::Byte) {
            Ok(TypeTag::Byte)
        } else if self.eat_kw(Kw::I16) {
            Ok(TypeTag::I16)
        } else if self.eat_kw(Kw::I32) {
            Ok(TypeTag::I32)
        } else if self.eat_kw(Kw::I64) {
            Ok(TypeTag::I64)
        } else if self.eat_kw(Kw::Double) {
            Ok(TypeTag::Double)
        } else if self.eat_kw(Kw::String) {
            Ok(TypeTag::String)
        } else if self.eat_kw(Kw::Binary) {
            Ok(TypeTag::Binary)
        } else if self.eat_kw(Kw::Map) {
            self.expect_punct('<')?;
            let key = self.parse_field_type()?;
            self.expect_punct(',')?;
            let value = self.parse_field_type()?;
            self.expect_punct('>')?;
            Ok(TypeTag::Map(Box::new(key), Box::new(value)))
        } else if self.eat_kw(Kw::List) {
            self.expect_punct('<')?;
            let element = self.parse_field_type()?;
            self.expect_punct('>')?;
            Ok(TypeTag::List(Box::new(element)))
        } else if self.eat_kw(Kw::Set) {
            self.expect_punct('<')?;
            let element = self.parse_field_type()?;
            self.expect_punct('>')?;
            Ok(TypeTag::Set(Box::new(element)))
        } else {
            Err(self.unexpected("a type"))
        }
    }

    // ---- constant values ----

    fn parse_const_value(&mut self) -> Result<Value, ThriftError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(value) => Ok(Value::Int(value)),
            TokenKind::Double(value) => Ok(Value::Double(value)),
            TokenKind::Str(value) => Ok(Value::String(value)),
            TokenKind::Bool(value) => Ok(Value::Bool(value)),
            TokenKind::Punct('[') => {
                let mut items = Vec::new();
                while !self.eat_punct(']') {
                    items.push(self.parse_const_value()?);
                    self.eat_sep();
                }
                Ok(Value::List(items))
            }
            TokenKind::Punct('{') => {
                let mut entries = Vec::new();
                while !self.eat_punct('}') {
                    let key = self.parse_const_value()?;
                    self.expect_punct(':')?;
                    let value = self.parse_const_value()?;
                    entries.push((key, value));
                    self.eat_sep();
                }
                Ok(Value::Map(entries))
            }
            TokenKind::Ident(path) => self.resolve_const(&path, token.line),
            other => Err(ThriftError::Grammar {
                expected: "a constant value".to_owned(),
                found: other.describe(),
                line: token.line,
            }),
        }
    }

    // ---- name resolution ----

    /// Walk a dotted path one segment at a time through the visible
    /// namespaces. Intermediate segments must name nested modules, except
    /// that `EnumName.MEMBER` yields the member's integer value.
    fn resolve_path(&self, path: &str, line: usize) -> Result<Symbol, ThriftError> {
        let unresolved = || ThriftError::UnresolvedReference {
            path: path.to_owned(),
            line,
        };

        let mut scope = &self.module;
        let mut segments = path.split('.').peekable();
        loop {
            let segment = segments.next().ok_or_else(unresolved)?;
            let symbol = scope.symbol(segment).ok_or_else(unresolved)?;
            if segments.peek().is_none() {
                return Ok(symbol.clone());
            }
            match symbol {
                Symbol::Module(child) => scope = child.as_ref(),
                Symbol::Enum(def) => {
                    let member = segments.next().ok_or_else(unresolved)?;
                    if segments.peek().is_some() {
                        return Err(unresolved());
                    }
                    let value = def.value_of(member).ok_or_else(unresolved)?;
                    return Ok(Symbol::Const(Value::Int(value)));
                }
                _ => return Err(unresolved()),
            }
        }
    }

    fn resolve_type(&self, path: &str, line: usize) -> Result<TypeTag, ThriftError> {
        self.resolve_path(path, line)?
            .as_type()
            .ok_or_else(|| ThriftError::UnresolvedReference {
                path: path.to_owned(),
                line,
            })
    }

    fn resolve_const(&self, path: &str, line: usize) -> Result<Value, ThriftError> {
        match self.resolve_path(path, line)? {
            Symbol::Const(value) => Ok(value),
            _ => Err(ThriftError::UnresolvedReference {
                path: path.to_owned(),
                line,
            }),
        }
    }

    fn resolve_service(
        &self,
        service: &str,
        target: &str,
        line: usize,
    ) -> Result<Rc<ServiceDef>, ThriftError> {
        match self.resolve_path(target, line) {
            Ok(Symbol::Service(def)) => Ok(def),
            _ => Err(ThriftError::ExtendsTarget {
                service: service.to_owned(),
                target: target.to_owned(),
                line,
            }),
        }
    }
}

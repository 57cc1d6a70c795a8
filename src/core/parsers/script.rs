use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, Globals, SourceFile, SourceMap, Spanned, sync::Lrc};
use swc_ecma_ast::{
    CallExpr, Callee, Expr, ExprOrSpread, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXExpr,
    JSXExprContainer, JSXOpeningElement, Lit, MemberProp, Module, Str,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

pub struct ParsedScript {
    pub module: Module,
    pub source_file: Lrc<SourceFile>,
}

/// How a string literal is handed to a key-taking function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLiteralShape {
    /// `t("key")`
    Argument,
    /// `t.call(thisArg, "key")`
    CallArgument,
    /// `t.apply(thisArg, ["key", ...])`
    ApplyArray,
    /// `<Trans id="key" />`
    JsxId,
}

/// A string literal in a key position. Offsets are byte offsets into the
/// parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLiteral {
    pub text: String,
    /// Start of the literal, quotes included.
    pub start: usize,
    pub length: usize,
    pub shape: KeyLiteralShape,
    /// Position whose type definition names the key-taking function: the
    /// callee of a call, the tag name of an element.
    pub anchor: usize,
}

/// Parse TS/TSX (or JS/JSX) source text into an AST.
pub fn parse_script_source(code: String, file_path: &str) -> Result<ParsedScript> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_map = SourceMap::default();
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let mut parser = Parser::new(syntax_for(file_path), StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))?;

        Ok(ParsedScript {
            module,
            source_file,
        })
    })
}

fn syntax_for(file_path: &str) -> Syntax {
    let lower = file_path.to_ascii_lowercase();
    if lower.ends_with(".js") || lower.ends_with(".jsx") || lower.ends_with(".mjs") {
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    } else {
        Syntax::Typescript(TsSyntax {
            tsx: !lower.ends_with(".ts"),
            ..Default::default()
        })
    }
}

impl ParsedScript {
    /// The string literal touching `position`, when it sits in one of the
    /// key-taking shapes.
    pub fn key_literal_at(&self, position: usize) -> Option<KeyLiteral> {
        let base = self.source_file.start_pos.0;
        let mut finder = KeyLiteralFinder {
            base,
            position: BytePos(base + u32::try_from(position).ok()?),
            found: None,
        };
        self.module.visit_with(&mut finder);
        finder.found
    }
}

struct KeyLiteralFinder {
    base: u32,
    position: BytePos,
    found: Option<KeyLiteral>,
}

impl KeyLiteralFinder {
    fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.base) as usize
    }

    fn try_literal(&mut self, s: &Str, shape: KeyLiteralShape, anchor: BytePos) {
        if self.found.is_some() || s.span.lo > self.position || s.span.hi < self.position {
            return;
        }
        let Some(text) = s.value.as_str() else {
            return;
        };
        self.found = Some(KeyLiteral {
            text: text.to_string(),
            start: self.offset(s.span.lo),
            length: (s.span.hi.0 - s.span.lo.0) as usize,
            shape,
            anchor: self.offset(anchor),
        });
    }

    fn check_call(&mut self, node: &CallExpr) {
        let Callee::Expr(callee) = &node.callee else {
            return;
        };
        let anchor = callee.span().lo;
        let method = match &**callee {
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(ident) => Some(ident.sym.as_str()),
                _ => None,
            },
            _ => None,
        };

        if let Some(s) = string_arg(node.args.first()) {
            self.try_literal(s, KeyLiteralShape::Argument, anchor);
        }
        match method {
            Some("call") => {
                if let Some(s) = string_arg(node.args.get(1)) {
                    self.try_literal(s, KeyLiteralShape::CallArgument, anchor);
                }
            }
            Some("apply") => {
                for arg in &node.args {
                    if arg.spread.is_none()
                        && let Expr::Array(array) = &*arg.expr
                        && let Some(Some(first)) = array.elems.first()
                        && let Some(s) = string_arg(Some(first))
                    {
                        self.try_literal(s, KeyLiteralShape::ApplyArray, anchor);
                    }
                }
            }
            _ => {}
        }
    }

    fn check_jsx(&mut self, node: &JSXOpeningElement) {
        let anchor = node.name.span().lo;
        for attr in &node.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                continue;
            };
            let JSXAttrName::Ident(name) = &attr.name else {
                continue;
            };
            if name.sym.as_str() != "id" {
                continue;
            }
            match &attr.value {
                Some(JSXAttrValue::Str(s)) => self.try_literal(s, KeyLiteralShape::JsxId, anchor),
                Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
                    expr: JSXExpr::Expr(expr),
                    ..
                })) => {
                    if let Expr::Lit(Lit::Str(s)) = &**expr {
                        self.try_literal(s, KeyLiteralShape::JsxId, anchor);
                    }
                }
                _ => {}
            }
        }
    }
}

fn string_arg(arg: Option<&ExprOrSpread>) -> Option<&Str> {
    let arg = arg?;
    if arg.spread.is_some() {
        return None;
    }
    match &*arg.expr {
        Expr::Lit(Lit::Str(s)) => Some(s),
        _ => None,
    }
}

impl Visit for KeyLiteralFinder {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.found.is_none() {
            self.check_call(node);
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_opening_element(&mut self, node: &JSXOpeningElement) {
        if self.found.is_none() {
            self.check_jsx(node);
        }
        node.visit_children_with(self);
    }
}
